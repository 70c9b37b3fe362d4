//! `ops search`: ranked keyword retrieval from the command line.

use anyhow::Result;

use ops_index_core::models::ResultRecord;
use ops_index_core::search::RetrieveRequest;
use ops_index_core::store::ChunkStore;

use crate::config::Config;
use crate::file_store::FileStore;

/// Facet selections shared by the CLI and the HTTP surface.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub subjects: Vec<String>,
    pub grades: Vec<String>,
    pub content_types: Vec<String>,
}

/// Build a [`RetrieveRequest`], falling back to configured defaults for
/// anything the caller left unset.
pub fn build_request(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    filters: Filters,
    min_score: Option<f64>,
) -> RetrieveRequest {
    RetrieveRequest::new(query)
        .limit(limit.unwrap_or(config.retrieval.default_limit))
        .subjects(filters.subjects)
        .grades(filters.grades)
        .content_types(filters.content_types)
        .min_score(min_score.unwrap_or(config.retrieval.min_score))
}

pub async fn run_search(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    filters: Filters,
    min_score: Option<f64>,
    json: bool,
) -> Result<()> {
    let store = FileStore::from_config(config);
    let req = build_request(config, query, limit, filters, min_score);
    let results = store.retrieve(&req).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    print_results(&results);
    Ok(())
}

fn print_results(results: &[ResultRecord]) {
    for (i, r) in results.iter().enumerate() {
        match r.score {
            Some(score) => println!("{}. [{:.4}] {}", i + 1, score, r.id),
            None => println!("{}. {}", i + 1, r.id),
        }
        println!("    subject: {}", display_facet(&r.subject));
        println!("    grade: {}", display_facet(&r.grade_context));
        println!("    type: {}", display_facet(&r.content_type));
        println!("    source: {}", r.source);
        println!("    text: \"{}\"", r.text.replace('\n', " ").trim());
        println!();
    }
}

fn display_facet(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_uses_config_defaults() {
        let mut cfg = Config::for_data_path("x.json");
        cfg.retrieval.default_limit = 3;
        cfg.retrieval.min_score = 0.5;

        let req = build_request(&cfg, "kertotaulu", None, Filters::default(), None);
        assert_eq!(req.query, "kertotaulu");
        assert_eq!(req.limit, 3);
        assert_eq!(req.min_score, 0.5);
        assert!(req.subjects.is_empty());
    }

    #[test]
    fn test_build_request_overrides() {
        let cfg = Config::for_data_path("x.json");
        let filters = Filters {
            subjects: vec!["Historia".to_string()],
            grades: vec!["3-6".to_string()],
            content_types: vec![],
        };
        let req = build_request(&cfg, "", Some(1), filters, Some(-1.0));
        assert_eq!(req.limit, 1);
        assert_eq!(req.min_score, -1.0);
        assert_eq!(req.subjects, vec!["Historia"]);
        assert_eq!(req.grades, vec!["3-6"]);
    }
}
