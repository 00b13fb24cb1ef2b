//! Loading and querying the template index (`index.json`).

use template_model::{MockupTemplate, TemplateIndex};
use tracing::{debug, warn};

use crate::asset::AssetRef;
use crate::error::{Error, Result};

pub const DEFAULT_TEMPLATE_SOURCE: &str =
    "https://raw.githubusercontent.com/rmenon1008/mockupgen-templates/main";

pub const INDEX_FILE: &str = "index.json";

/// Reads `<root>/index.json` from disk or over HTTP.
///
/// # Errors
/// [`Error::ManifestNotFound`] when the index cannot be read or fetched and
/// [`Error::Manifest`] when it is not valid for the template schema.
pub fn load_index(root: &AssetRef) -> Result<TemplateIndex> {
    let asset = root.join(INDEX_FILE);
    let bytes = asset
        .read_bytes()
        .map_err(|err| Error::ManifestNotFound(format!("{asset}: {err:#}")))?;
    let index = parse_index(&bytes, &asset.to_string())?;
    debug!(
        source = %asset,
        version = %index.version_label(),
        templates = index.templates.len(),
        "loaded template index"
    );
    for template in &index.templates {
        if let Err(err) = template.validate() {
            warn!(template = %template.slug, "template looks misconfigured: {err:#}");
        }
    }
    Ok(index)
}

pub fn parse_index(bytes: &[u8], label: &str) -> Result<TemplateIndex> {
    serde_json::from_slice(bytes).map_err(|source| Error::Manifest {
        path: label.to_string(),
        source,
    })
}

/// Resolves a user's template choice, accepting numbers as shown by the
/// grouped listing.
pub fn select<'a>(index: &'a TemplateIndex, query: &str) -> Result<&'a MockupTemplate> {
    index
        .select_listed(query)
        .ok_or_else(|| Error::UnknownTemplate(query.to_string()))
}

/// Renders the grouped listing printed by `--list` and the interactive prompt.
pub fn render_listing(index: &TemplateIndex) -> String {
    let mut out = String::new();
    for group in index.grouped() {
        out.push_str(group.category);
        out.push_str(":\n");
        for (number, template) in group.entries {
            out.push_str(&format!("  {number}. {}\n", template.name));
        }
    }
    out
}
