//! Environment variable assignments for packed products.

use super::ShellFlavor;
use crate::{config::ProductDescriptor, package::Result};

/// Renders the variable assignments a packed application needs.
///
/// The launcher and the environment file both embed this text at their
/// environment insertion point. Every path it produces must go through
/// [`ShellFlavor::relocated`] so it stays valid wherever the archive is
/// extracted.
pub trait EnvironmentWriter {
    /// Assignments for `products`, whose installations live under
    /// `binaries_root` inside the archive.
    fn render(
        &self,
        products: &[ProductDescriptor],
        binaries_root: &str,
        flavor: ShellFlavor,
    ) -> Result<String>;
}

/// Default writer: one `<NAME>_ROOT_DIR` per packed installation plus the
/// matching `PATH` and library path entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductEnvironment;

impl EnvironmentWriter for ProductEnvironment {
    fn render(
        &self,
        products: &[ProductDescriptor],
        binaries_root: &str,
        flavor: ShellFlavor,
    ) -> Result<String> {
        let mut out = String::new();

        for product in products.iter().filter(|p| p.ships_binaries()) {
            let installs = std::iter::once(product.name.as_str())
                .chain(product.components.iter().map(String::as_str));

            for install in installs {
                let var = root_var_name(install);
                let root = flavor.var_ref(&var);
                out.push_str(&flavor.comment(install));
                out.push_str(&flavor.set_var(&var, &flavor.relocated(&[binaries_root, install])));
                out.push_str(&flavor.prepend_path("PATH", &flavor.join(&root, "bin")));
                if flavor == ShellFlavor::Posix {
                    out.push_str(
                        &flavor.prepend_path("LD_LIBRARY_PATH", &flavor.join(&root, "lib")),
                    );
                } else {
                    out.push_str(&flavor.prepend_path("PATH", &flavor.join(&root, "lib")));
                }
            }
        }

        Ok(out)
    }
}

/// `GEOM` -> `GEOM_ROOT_DIR`, `py-numpy` -> `PY_NUMPY_ROOT_DIR`.
pub fn root_var_name(product: &str) -> String {
    let mut name: String = product
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    name.push_str("_ROOT_DIR");
    name
}
