use std::{
    collections::VecDeque,
    env,
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

/// Version-control metadata directories skipped while walking.
pub const VCS_DIRECTORIES: &[&str] = &[
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureFile {
    pub path: PathBuf,
    /// The path relative to the working directory, used to label results.
    pub name: String,
}

/// Finds fixture files under a directory. Every call to [`iter`](Self::iter)
/// starts a new walk, so the same discovery can be run any number of times.
#[derive(Debug, Clone)]
pub struct FixtureDiscovery {
    root: PathBuf,
    extension: String,
    ignore_vcs: bool,
}

impl FixtureDiscovery {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(root: P, extension: S) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
            ignore_vcs: true,
        }
    }

    pub fn set_ignore_vcs(&mut self, value: bool) {
        self.ignore_vcs = value;
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn iter(&self) -> FixtureFiles<'_> {
        FixtureFiles {
            discovery: self,
            working_directory: env::current_dir().ok(),
            directories: vec![self.root.clone()],
            files: VecDeque::new(),
        }
    }

    fn is_fixture(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(&self.extension))
    }

    fn is_ignored_directory(&self, path: &Path) -> bool {
        self.ignore_vcs
            && path
                .file_name()
                .and_then(OsStr::to_str)
                .map_or(false, |name| VCS_DIRECTORIES.contains(&name))
    }
}

impl<'a> IntoIterator for &'a FixtureDiscovery {
    type Item = io::Result<FixtureFile>;
    type IntoIter = FixtureFiles<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Depth-first walk yielding fixture files in name order, files of a
/// directory before its subdirectories.
#[derive(Debug)]
pub struct FixtureFiles<'a> {
    discovery: &'a FixtureDiscovery,
    working_directory: Option<PathBuf>,
    directories: Vec<PathBuf>,
    files: VecDeque<PathBuf>,
}

impl FixtureFiles<'_> {
    fn read_directory(&mut self, directory: &Path) -> io::Result<()> {
        let mut entries = fs::read_dir(directory)?.collect::<io::Result<Vec<_>>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut subdirectories = Vec::new();
        for entry in entries {
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                if !self.discovery.is_ignored_directory(&path) {
                    subdirectories.push(path);
                }
            } else if self.discovery.is_fixture(&path) {
                self.files.push_back(path);
            }
        }

        self.directories.extend(subdirectories.into_iter().rev());
        Ok(())
    }

    fn name_of(&self, path: &Path) -> String {
        self.working_directory
            .as_deref()
            .and_then(|working_directory| path.strip_prefix(working_directory).ok())
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

impl Iterator for FixtureFiles<'_> {
    type Item = io::Result<FixtureFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(path) = self.files.pop_front() {
                let name = self.name_of(&path);
                return Some(Ok(FixtureFile { path, name }));
            }

            let directory = self.directories.pop()?;
            if let Err(e) = self.read_directory(&directory) {
                return Some(Err(e));
            }
        }
    }
}
