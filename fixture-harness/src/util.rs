use crate::{data::Headers, error::Error};
use hyper::{
    header::{HeaderName, HeaderValue},
    HeaderMap, Version,
};

pub fn extract_headers(header_map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();

    // it currently ignores header values with opaque characters, and only
    // the first value of a repeated header is kept
    for (key, value) in header_map {
        if let Ok(value) = value.to_str() {
            headers
                .entry(String::from(key.as_str()))
                .or_insert_with(|| String::from(value));
        }
    }

    headers
}

/// Appends `headers` to `header_map`, converting each name into hyper's
/// lowercase header naming.
pub fn put_headers<'a, I: IntoIterator<Item = (&'a String, &'a String)>>(
    header_map: &mut HeaderMap<HeaderValue>,
    headers: I,
) -> Result<(), Error> {
    for (key, value) in headers {
        let header_name = HeaderName::from_lowercase(key.to_lowercase().as_bytes())
            .map_err(|_| Error::InvalidHeaderName(key.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| Error::InvalidHeaderValue(key.clone()))?;
        header_map.append(header_name, header_value);
    }

    Ok(())
}

/// Renders a protocol version the way fixtures write it after `HTTP/`.
pub fn protocol_version(version: Version) -> String {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "1.1",
    }
    .into()
}
