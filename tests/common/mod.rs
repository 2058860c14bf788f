//! Shared fixture: an application with three products on disk.
//!
//! - `A`: archive product, installed, acquired from `archives/A-1.0.tar.gz`
//! - `B`: git product, installed, sources in `SOURCES/B` (with a `.git` dir)
//! - `C`: native product, never installed
#![allow(dead_code)]

use flate2::read::GzDecoder;
use satpack::{
    config::Config,
    package::{Result, vcs::BuildDriver},
};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("satpack.toml")
    }

    pub fn config(&self) -> Config {
        Config::load(&self.config_path()).unwrap()
    }

    pub fn package_dir(&self) -> PathBuf {
        self.root().join("APP/PACKAGE")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.root().join("tmp")
    }
}

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

/// Lays out the fixture. `with_profile` adds a launcher profile on `A`.
pub fn workspace(with_profile: bool) -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(&root.join("INSTALL/A/bin/a"), "#!/bin/sh\n");
    write(&root.join("INSTALL/A/bin/salome/runSalome"), "#!/bin/sh\n");
    write(&root.join("INSTALL/B/lib/libb.so"), "ELF");
    write(&root.join("SOURCES/B/CMakeLists.txt"), "project(B)");
    write(&root.join("SOURCES/B/.git/HEAD"), "ref: refs/heads/master");
    write(&root.join("archives/A-1.0.tar.gz"), "not really gzip");
    write(&root.join("salomeTools/sat"), "#!/bin/sh\n");
    write(&root.join("salomeTools/.git/HEAD"), "ref: refs/heads/master");
    write(&root.join("conf/scripts/B.sh"), "cmake ..");
    fs::create_dir_all(root.join("tmp")).unwrap();

    write(
        &root.join("conf/A.pyconf"),
        "name = \"A\"\nget_source = \"archive\"\n\n[archive_info]\narchive_name = \"/somewhere/A-1.0.tar.gz\"\n",
    );
    write(
        &root.join("conf/B.pyconf"),
        "name = \"B\"\nget_source = \"git\"\ncompil_script = \"/abs/B.sh\"\n\n[git_info]\nrepo = \"https://git.example.org/b.git\"\n",
    );
    write(&root.join("conf/C.pyconf"), "name = \"C\"\nget_source = \"native\"\n");
    write(
        &root.join("conf/APP.pyconf"),
        "name = \"APP\"\nworkdir = \"/abs/APP\"\n",
    );

    let profile = if with_profile {
        "\n[application.profile]\nproduct = \"A\"\nlauncher_name = \"salome\"\n"
    } else {
        ""
    };
    let r = root.display();
    let config = format!(
        r#"[tools]
root = "{r}/salomeTools"
ignored_extensions = [".pyc"]
tmp_dir = "{r}/tmp"

[platform]
tag = "CO7"
windows = false

[application]
name = "APP"
workdir = "{r}/APP"
descriptor = "{r}/conf/APP.pyconf"
{profile}
[[products]]
name = "A"
get_source = "archive"
descriptor = "{r}/conf/A.pyconf"
archive = "{r}/archives/A-1.0.tar.gz"
install_dir = "{r}/INSTALL/A"

[[products]]
name = "B"
get_source = "git"
descriptor = "{r}/conf/B.pyconf"
install_dir = "{r}/INSTALL/B"
source_dir = "{r}/SOURCES/B"
compil_script = "{r}/conf/scripts/B.sh"

[[products]]
name = "C"
get_source = "native"
descriptor = "{r}/conf/C.pyconf"
"#
    );
    write(&root.join("satpack.toml"), &config);

    Workspace { dir }
}

/// Records driver calls and recreates the source tree on fetch.
pub struct FakeDriver {
    pub calls: Mutex<Vec<String>>,
    pub sources: PathBuf,
}

impl FakeDriver {
    pub fn new(sources: PathBuf) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            sources,
        }
    }
}

impl BuildDriver for FakeDriver {
    async fn clean_sources(&self, products: &[String]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("clean {}", products.join(",")));
        Ok(())
    }

    async fn fetch_sources(&self, products: &[String]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("source {}", products.join(",")));
        for p in products {
            fs::create_dir_all(self.sources.join(p)).unwrap();
        }
        Ok(())
    }
}

/// Entry names of a `.tgz`, without trailing slashes.
pub fn archive_names(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).unwrap();
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive
        .entries()
        .unwrap()
        .map(|e| {
            let e = e.unwrap();
            e.path()
                .unwrap()
                .to_string_lossy()
                .trim_end_matches('/')
                .to_string()
        })
        .collect()
}

/// Text of the archive entry `name`.
pub fn archive_text(path: &Path, name: &str) -> String {
    use std::io::Read;
    let file = fs::File::open(path).unwrap();
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        if entry.path().unwrap().to_string_lossy() == name {
            let mut text = String::new();
            entry.read_to_string(&mut text).unwrap();
            return text;
        }
    }
    panic!("{name} not in {}", path.display());
}
