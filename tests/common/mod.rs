//! Shared helpers for running the `oxtbuild` binary against scratch folders.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use tempfile::TempDir;

/// A scratch extension folder named `my-ext` inside its own temp dir.
pub struct SourceFixture {
    pub temp: TempDir,
    pub source: PathBuf,
}

impl SourceFixture {
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let temp = tempfile::tempdir().expect("create temp dir");
        let source = temp.path().join("my-ext");
        fs::create_dir_all(&source).expect("create source dir");
        for (relative, body) in files {
            let path = source.join(relative);
            fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
            fs::write(path, body).expect("write fixture file");
        }
        Self { temp, source }
    }

    pub fn archive_path(&self) -> PathBuf {
        self.temp.path().join("my-ext.oxt")
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.source.join(relative)).expect("read source file")
    }

    /// Run the binary on this folder with `args`, feeding `stdin` if given.
    pub fn run(&self, args: &[&str], stdin: Option<&str>) -> Output {
        run_oxtbuild(&self.source, args, stdin)
    }
}

pub fn run_oxtbuild(source: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = spawn_oxtbuild(source, args);
    {
        let mut pipe = child.stdin.take().expect("stdin pipe");
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).expect("write stdin");
        }
    }
    child.wait_with_output().expect("wait for oxtbuild")
}

/// Start the binary with every stdio stream piped and leave it running.
pub fn spawn_oxtbuild(source: &Path, args: &[&str]) -> Child {
    Command::new(env!("CARGO_BIN_EXE_oxtbuild"))
        .arg(source)
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn oxtbuild")
}

/// Entry names of a zip archive, sorted.
pub fn archive_entries(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).expect("open archive");
    let archive = zip::ZipArchive::new(file).expect("read archive");
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

pub fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
