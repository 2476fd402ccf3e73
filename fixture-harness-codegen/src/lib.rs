use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote, quote_spanned};
use syn::spanned::Spanned;
use std::{
    collections::HashSet,
    env, fs, io,
    path::{Path, PathBuf},
};

/// Same list as `fixture_harness::discovery::VCS_DIRECTORIES`; this crate
/// cannot depend on the harness.
const VCS_DIRECTORIES: &[&str] = &[
    ".svn",
    "_svn",
    "CVS",
    "_darcs",
    ".arch-params",
    ".monotone",
    ".bzr",
    ".git",
    ".hg",
];

/// Generates one `#[tokio::test]` per markdown fixture under a directory
/// (relative to the crate root). The annotated function builds the client
/// each fixture runs against; an optional function argument adjusts the
/// `HarnessConfiguration`.
///
/// Fixtures are collected when the crate compiles, before any configuration
/// function runs, so `set_extension` and `set_ignore_vcs` do not change which
/// tests exist. Pass `extension = "..."` (default `md`) or `ignore_vcs = false`
/// to the macro instead.
///
/// ```ignore
/// #[fixture_tests("fixtures", configure, extension = "md")]
/// fn example_api() -> ServiceClient<ExampleApi> {
///     ServiceClient::new(ExampleApi::default())
/// }
/// ```
#[proc_macro_attribute]
pub fn fixture_tests(attrs: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as syn::ItemFn);
    let args = syn::parse_macro_input!(attrs as syn::AttributeArgs);

    let fixtures_dir = if let Some(syn::NestedMeta::Lit(syn::Lit::Str(fixtures_dir))) = args.first()
    {
        fixtures_dir
    } else {
        return quote! {
            compile_error!("The first argument should be the fixtures directory as a string literal!");
        }
        .into();
    };

    let mut configuration_function = None;
    let mut walk = FixtureWalk::default();
    for arg in &args[1..] {
        match arg {
            syn::NestedMeta::Meta(syn::Meta::Path(function_path))
                if configuration_function.is_none() =>
            {
                configuration_function = Some(function_path)
            }
            syn::NestedMeta::Meta(syn::Meta::NameValue(syn::MetaNameValue {
                path,
                lit: syn::Lit::Str(extension),
                ..
            })) if path.is_ident("extension") => walk.extension = extension.value(),
            syn::NestedMeta::Meta(syn::Meta::NameValue(syn::MetaNameValue {
                path,
                lit: syn::Lit::Bool(ignore_vcs),
                ..
            })) if path.is_ident("ignore_vcs") => walk.ignore_vcs = ignore_vcs.value,
            other => {
                return compile_error(
                    "Expected a configuration function, `extension = \"...\"` or `ignore_vcs = <bool>`",
                    other.span(),
                )
            }
        }
    }

    let manifest_dir = env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_default();
    let root = manifest_dir.join(fixtures_dir.value());

    let files = match walk.collect(&root) {
        Ok(files) if !files.is_empty() => files,
        Ok(_) => {
            return compile_error(
                &format!("No .{} fixtures found in {}", walk.extension, root.display()),
                fixtures_dir.span(),
            )
        }
        Err(e) => {
            return compile_error(
                &format!("Couldn't read fixtures from {}: {}", root.display(), e),
                fixtures_dir.span(),
            )
        }
    };

    let factory = &input.sig.ident;
    let module = format_ident!("{}_fixtures", factory);
    let root_path = root.display().to_string();
    let extension = &walk.extension;
    let ignore_vcs = walk.ignore_vcs;
    let configure = configuration_function.map(|function_path| {
        quote! { #function_path(&mut __fixture_configuration); }
    });

    let mut used_names = HashSet::new();
    let tests = files.iter().map(|path| {
        let test_name = test_name(path.strip_prefix(&root).unwrap_or(path), &mut used_names);
        let fixture_name = path
            .strip_prefix(&manifest_dir)
            .unwrap_or(path)
            .display()
            .to_string();
        let fixture_path = path.display().to_string();

        quote! {
            #[::tokio::test]
            async fn #test_name() {
                // ties the test binary to the fixture so edits trigger a rebuild
                const _: &str = include_str!(#fixture_path);

                let mut __fixture_configuration =
                    ::fixture_harness::HarnessConfiguration::new(#root_path);
                __fixture_configuration.set_extension(#extension);
                __fixture_configuration.set_ignore_vcs(#ignore_vcs);
                #configure
                ::fixture_harness::FixtureRunner::new(__fixture_configuration, #factory)
                    .assert_fixture(#fixture_name, #fixture_path)
                    .await;
            }
        }
    });

    let output = quote! {
        #input

        #[cfg(test)]
        mod #module {
            #[allow(unused_imports)]
            use super::*;

            #(#tests)*
        }
    };

    TokenStream::from(output)
}

fn compile_error(message: &str, span: Span) -> TokenStream {
    quote_spanned! {span=>
        compile_error!(#message);
    }
    .into()
}

/// Mirrors the runner's discovery: sorted, depth first, files before
/// subdirectories.
struct FixtureWalk {
    extension: String,
    ignore_vcs: bool,
}

impl Default for FixtureWalk {
    fn default() -> Self {
        Self {
            extension: String::from("md"),
            ignore_vcs: true,
        }
    }
}

impl FixtureWalk {
    fn collect(&self, directory: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(directory)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<io::Result<Vec<_>>>()?;
        entries.sort();

        let mut fixtures = Vec::new();
        let mut subdirectories = Vec::new();
        for path in entries {
            if path.is_dir() {
                if !(self.ignore_vcs && is_vcs_directory(&path)) {
                    subdirectories.push(path);
                }
            } else if path
                .extension()
                .map_or(false, |extension| extension == self.extension.as_str())
            {
                fixtures.push(path);
            }
        }

        for subdirectory in subdirectories {
            fixtures.extend(self.collect(&subdirectory)?);
        }

        Ok(fixtures)
    }
}

fn is_vcs_directory(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| VCS_DIRECTORIES.contains(&name))
}

/// `nested/get-example.md` becomes `nested_get_example`.
fn test_name(relative: &Path, used_names: &mut HashSet<String>) -> syn::Ident {
    let stem = relative.with_extension("");
    let mut name = stem
        .to_string_lossy()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect::<String>();

    if syn::parse_str::<syn::Ident>(&name).is_err() {
        name = format!("fixture_{}", name);
    }

    let mut unique_name = name.clone();
    let mut counter = 2;
    while !used_names.insert(unique_name.clone()) {
        unique_name = format!("{}_{}", name, counter);
        counter += 1;
    }

    format_ident!("{}", unique_name)
}
