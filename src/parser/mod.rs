macro_rules! selector {
    ($name:ident, $css:literal) => {
        static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

pub mod members;
pub mod notes;
pub mod object;
pub mod text;
pub mod types;
pub mod xref;

use anyhow::Result;
use scraper::Html;

use crate::model::ApiObject;

/// Page markup → [`ApiObject`]. The parsed DOM lives only for this call.
pub fn resolve_object(html: &str) -> Result<ApiObject> {
    let doc = Html::parse_document(html);
    object::extract_object(&doc)
}
