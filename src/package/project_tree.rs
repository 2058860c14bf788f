//! Materializing a self-contained project tree for source packages.
//!
//! The tree mirrors a hand-written project: one descriptor per product, the
//! application descriptor, and the auxiliary scripts those descriptors
//! reference. Descriptors are rewritten so that nothing points back to the
//! packaging host:
//!
//! - compilation scripts, environment scripts and patches are copied under
//!   `products/` and referenced by base name
//! - VCS products become archive products (`<name>.tgz`) unless the VCS
//!   metadata is kept
//! - the application works relative to the packaged tools and never reuses a
//!   shared base installation

use super::{
    Error, Result,
    error::ErrorExt,
    resources::{self, Templates},
    utils::fs,
    vcs::snapshot_name,
};
use crate::config::{
    ApplicationConfig, ProductDescriptor, SourceKind,
    descriptor::{
        self, ApplicationFile, ArchiveInfo, DESCRIPTOR_DIR_VAR, DESCRIPTOR_HEADER,
        PROJECT_PATH_VAR, ProductFile, TOOLS_DIR_VAR,
    },
};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Archive-relative root of the embedded project.
pub const PROJECT_DIR: &str = "PROJECT";

/// Directory layout of a materialized project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTree {
    root: PathBuf,
}

impl ProjectTree {
    /// Layout rooted at `<work_dir>/PROJECT`. Nothing is created.
    pub fn new(work_dir: &Path) -> Self {
        Self {
            root: work_dir.join(PROJECT_DIR),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn products_dir(&self) -> PathBuf {
        self.root.join("products")
    }

    pub fn compil_scripts_dir(&self) -> PathBuf {
        self.products_dir().join("compil_scripts")
    }

    pub fn env_scripts_dir(&self) -> PathBuf {
        self.products_dir().join("env_scripts")
    }

    pub fn patches_dir(&self) -> PathBuf {
        self.products_dir().join("patches")
    }

    pub fn applications_dir(&self) -> PathBuf {
        self.root.join("applications")
    }

    pub fn jobs_dir(&self) -> PathBuf {
        self.root.join("jobs")
    }

    pub fn machines_dir(&self) -> PathBuf {
        self.root.join("machines")
    }

    /// `project.pyconf`.
    pub fn project_descriptor(&self) -> PathBuf {
        self.root.join(descriptor::descriptor_file_name("project"))
    }

    pub fn product_descriptor(&self, product: &str) -> PathBuf {
        self.products_dir()
            .join(descriptor::descriptor_file_name(product))
    }

    pub fn application_descriptor(&self, application: &str) -> PathBuf {
        self.applications_dir()
            .join(descriptor::descriptor_file_name(application))
    }

    async fn create_skeleton(&self) -> Result<()> {
        for dir in [
            self.compil_scripts_dir(),
            self.env_scripts_dir(),
            self.patches_dir(),
            self.applications_dir(),
            self.jobs_dir(),
            self.machines_dir(),
        ] {
            fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }
}

/// Writes the project tree for `products` and `application` under
/// `<work_dir>/PROJECT`.
///
/// With `keep_vcs_metadata`, VCS products keep their repository sections;
/// otherwise they are declared as archive products named `<name>.tgz`.
pub async fn materialize(
    templates: &Templates,
    products: &[ProductDescriptor],
    application: &ApplicationConfig,
    work_dir: &Path,
    keep_vcs_metadata: bool,
) -> Result<ProjectTree> {
    let tree = ProjectTree::new(work_dir);
    tree.create_skeleton().await?;

    let project = templates.render(
        resources::PROJECT_DESCRIPTOR,
        &json!({
            "header": DESCRIPTOR_HEADER,
            "application": application.name,
            "project_root": DESCRIPTOR_DIR_VAR,
            "project_var": PROJECT_PATH_VAR,
        }),
    )?;
    let project_path = tree.project_descriptor();
    tokio::fs::write(&project_path, project)
        .await
        .fs_context("writing project descriptor", &project_path)?;

    for product in products {
        log::debug!("Materializing descriptor of {}", product.name);
        let file = rewrite_product(product, &tree, keep_vcs_metadata).await?;
        descriptor::write_descriptor(&tree.product_descriptor(&product.name), &file).await?;
    }

    let app = rewrite_application(application).await?;
    descriptor::write_descriptor(&tree.application_descriptor(&application.name), &app).await?;

    Ok(tree)
}

async fn rewrite_product(
    product: &ProductDescriptor,
    tree: &ProjectTree,
    keep_vcs_metadata: bool,
) -> Result<ProductFile> {
    let path = product
        .descriptor
        .as_deref()
        .ok_or_else(|| Error::Descriptor {
            path: PathBuf::from(descriptor::descriptor_file_name(&product.name)),
            reason: format!("no descriptor configured for product {}", product.name),
        })?;
    let mut file: ProductFile = descriptor::read_descriptor(path).await?;

    if let Some(script) = &product.compil_script {
        file.compil_script = Some(fs::copy_into(script, &tree.compil_scripts_dir()).await?);
    }

    if let Some(script) = &product.env_script {
        let name = fs::copy_into(script, &tree.env_scripts_dir()).await?;
        file.environ.get_or_insert_with(Default::default).env_script = Some(name);
    }

    if !product.patches.is_empty() {
        let mut names = Vec::with_capacity(product.patches.len());
        for patch in &product.patches {
            names.push(fs::copy_into(patch, &tree.patches_dir()).await?);
        }
        file.patches = names;
    }

    if product.is_vcs() && !keep_vcs_metadata {
        file.get_source = SourceKind::Archive;
        file.archive_info = Some(ArchiveInfo {
            archive_name: snapshot_name(&product.name),
            other: Default::default(),
        });
        file.clear_vcs_info();
    } else if product.get_source == SourceKind::Archive {
        if let Some(archive) = &product.archive {
            let name = fs::file_name(archive)?;
            file.archive_info
                .get_or_insert_with(Default::default)
                .archive_name = name;
        }
    }

    Ok(file)
}

async fn rewrite_application(application: &ApplicationConfig) -> Result<ApplicationFile> {
    let mut file: ApplicationFile = descriptor::read_descriptor(&application.descriptor).await?;
    file.workdir = format!("{TOOLS_DIR_VAR}/../{}", application.name);
    file.base = Some("no".into());
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::descriptor::parse_descriptor;

    struct Fixture {
        _dir: tempfile::TempDir,
        root: PathBuf,
        products: Vec<ProductDescriptor>,
        application: ApplicationConfig,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let conf = root.join("conf");
        std::fs::create_dir_all(conf.join("scripts")).unwrap();

        std::fs::write(
            conf.join("GEOM.pyconf"),
            "name = \"GEOM\"\nget_source = \"git\"\ncompil_script = \"/abs/GEOM.sh\"\n\n\
             [git_info]\nrepo = \"https://git.example.org/geom.git\"\ntag = \"V9\"\n",
        )
        .unwrap();
        std::fs::write(
            conf.join("boost.pyconf"),
            "name = \"boost\"\nget_source = \"archive\"\n\n[archive_info]\narchive_name = \"/abs/boost.tgz\"\n",
        )
        .unwrap();
        std::fs::write(
            conf.join("APP.pyconf"),
            "name = \"APP\"\nworkdir = \"/abs/APP\"\n\n[products]\nGEOM = \"V9\"\n",
        )
        .unwrap();
        std::fs::write(conf.join("scripts/GEOM.sh"), "cmake ..").unwrap();
        std::fs::write(conf.join("scripts/GEOM_env.py"), "env").unwrap();
        std::fs::write(conf.join("scripts/fix.patch"), "--- a").unwrap();

        let mut geom = ProductDescriptor::new("GEOM", SourceKind::Git);
        geom.descriptor = Some(conf.join("GEOM.pyconf"));
        geom.compil_script = Some(conf.join("scripts/GEOM.sh"));
        geom.env_script = Some(conf.join("scripts/GEOM_env.py"));
        geom.patches = vec![conf.join("scripts/fix.patch")];

        let mut boost = ProductDescriptor::new("boost", SourceKind::Archive);
        boost.descriptor = Some(conf.join("boost.pyconf"));
        boost.archive = Some(root.join("archives/boost-1.82.tar.gz"));

        let application = ApplicationConfig {
            name: "APP".into(),
            workdir: root.join("APP"),
            descriptor: conf.join("APP.pyconf"),
            package_dir: None,
            profile: None,
        };

        Fixture {
            _dir: dir,
            root,
            products: vec![geom, boost],
            application,
        }
    }

    fn read_product(tree: &ProjectTree, name: &str) -> ProductFile {
        let path = tree.product_descriptor(name);
        parse_descriptor(&std::fs::read_to_string(&path).unwrap(), &path).unwrap()
    }

    #[tokio::test]
    async fn vcs_products_become_archives() {
        let fx = fixture();
        let templates = Templates::embedded().unwrap();
        let tree = materialize(&templates, &fx.products, &fx.application, &fx.root.join("w"), false)
            .await
            .unwrap();

        let geom = read_product(&tree, "GEOM");
        assert_eq!(geom.get_source, SourceKind::Archive);
        assert_eq!(geom.archive_info.unwrap().archive_name, "GEOM.tgz");
        assert!(geom.git_info.is_none());
        assert_eq!(geom.compil_script.as_deref(), Some("GEOM.sh"));
        assert_eq!(geom.environ.unwrap().env_script.as_deref(), Some("GEOM_env.py"));
        assert_eq!(geom.patches, ["fix.patch"]);
        assert!(tree.compil_scripts_dir().join("GEOM.sh").is_file());
        assert!(tree.env_scripts_dir().join("GEOM_env.py").is_file());
        assert!(tree.patches_dir().join("fix.patch").is_file());

        let boost = read_product(&tree, "boost");
        assert_eq!(boost.archive_info.unwrap().archive_name, "boost-1.82.tar.gz");
    }

    #[tokio::test]
    async fn vcs_metadata_can_be_kept() {
        let fx = fixture();
        let templates = Templates::embedded().unwrap();
        let tree = materialize(&templates, &fx.products, &fx.application, &fx.root.join("w"), true)
            .await
            .unwrap();

        let geom = read_product(&tree, "GEOM");
        assert_eq!(geom.get_source, SourceKind::Git);
        let info = geom.git_info.unwrap();
        assert_eq!(info.get("tag").and_then(|v| v.as_str()), Some("V9"));
        assert!(geom.archive_info.is_none());
    }

    #[tokio::test]
    async fn application_is_self_contained() {
        let fx = fixture();
        let templates = Templates::embedded().unwrap();
        let tree = materialize(&templates, &fx.products, &fx.application, &fx.root.join("w"), false)
            .await
            .unwrap();

        let path = tree.application_descriptor("APP");
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(DESCRIPTOR_HEADER));
        let app: ApplicationFile = parse_descriptor(&text, &path).unwrap();
        assert_eq!(app.workdir, "${tools_dir}/../APP");
        assert_eq!(app.base.as_deref(), Some("no"));
        assert!(app.other.contains_key("products"));

        let project = std::fs::read_to_string(tree.project_descriptor()).unwrap();
        assert!(project.starts_with(DESCRIPTOR_HEADER));
        assert!(project.contains("project_path = \"${descriptor_dir}\""));
        assert!(project.contains("PRODUCTPATH = \"${project_path}/products\""));
        assert!(tree.jobs_dir().is_dir() && tree.machines_dir().is_dir());
    }

    #[tokio::test]
    async fn materializing_twice_is_byte_identical() {
        let fx = fixture();
        let templates = Templates::embedded().unwrap();
        let first = materialize(&templates, &fx.products, &fx.application, &fx.root.join("a"), false)
            .await
            .unwrap();
        let second = materialize(&templates, &fx.products, &fx.application, &fx.root.join("b"), false)
            .await
            .unwrap();

        for (a, b) in [
            (first.product_descriptor("GEOM"), second.product_descriptor("GEOM")),
            (first.product_descriptor("boost"), second.product_descriptor("boost")),
            (first.application_descriptor("APP"), second.application_descriptor("APP")),
            (first.project_descriptor(), second.project_descriptor()),
        ] {
            assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
        }
    }

    #[tokio::test]
    async fn missing_descriptor_is_fatal() {
        let fx = fixture();
        let templates = Templates::embedded().unwrap();
        let mut products = fx.products.clone();
        products[1].descriptor = Some(fx.root.join("conf/absent.pyconf"));
        let res = materialize(&templates, &products, &fx.application, &fx.root.join("w"), false).await;
        assert!(matches!(res, Err(Error::Descriptor { .. })));
    }
}
