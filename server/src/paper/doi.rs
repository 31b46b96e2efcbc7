use std::sync::LazyLock;

use regex::Regex;

static RESOLVER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://(dx\.)?doi\.org/").expect("valid DOI prefix regex"));

/// Strip a resolver URL prefix, leaving the bare DOI.
///
/// `https://doi.org/10.1/xyz` and `http://dx.doi.org/10.1/xyz` both become
/// `10.1/xyz`; anything else is returned as is.
pub fn clean_doi(doi: &str) -> String {
    RESOLVER_PREFIX.replace(doi, "").into_owned()
}
