use serde::{Deserialize, Serialize};

use super::error::NarrativeError;

/// Default number of findings returned.
pub const DEFAULT_MAX_RESULTS: usize = 5;

pub const NO_RESULTS_SUMMARY: &str = "No research results to summarize.";
pub const SUMMARY_FAILED: &str = "Failed to generate summary.";

/// Optional research filters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchFilters {
    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub end_date: Option<String>,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub max_results: Option<usize>,
}

impl ResearchFilters {
    pub fn max_results(&self) -> usize {
        match self.max_results {
            Some(n) if n > 0 => n,
            _ => DEFAULT_MAX_RESULTS,
        }
    }
}

/// A single research finding as returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchFinding {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,

    #[serde(default)]
    pub relevance: f64,
}

#[derive(Deserialize)]
struct FindingsEnvelope {
    #[serde(default)]
    results: Vec<ResearchFinding>,
}

/// Slice from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Parse findings from model output.
pub fn parse_findings(text: &str) -> Result<Vec<ResearchFinding>, NarrativeError> {
    let json = extract_json(text)
        .ok_or_else(|| NarrativeError::Parse("no JSON object in model output".into()))?;

    let envelope: FindingsEnvelope =
        serde_json::from_str(json).map_err(|e| NarrativeError::Parse(e.to_string()))?;

    Ok(envelope.results)
}

pub fn research_prompt(query: &str, filters: &ResearchFilters) -> String {
    let categories = if filters.categories.is_empty() {
        String::new()
    } else {
        format!("Focus on these categories: {}", filters.categories.join(", "))
    };

    let period = match (&filters.start_date, &filters.end_date) {
        (Some(start), Some(end)) => format!("Limit findings to the period {} to {}.", start, end),
        (Some(start), None) => format!("Limit findings to developments since {}.", start),
        (None, Some(end)) => format!("Limit findings to developments before {}.", end),
        (None, None) => String::new(),
    };

    format!(
        r#"Research the following query in depth: "{query}"

Please provide detailed findings including:
1. The most relevant information about this topic
2. Key facts and data points
3. Different perspectives if applicable
4. Recent developments on this subject

{categories}
{period}

Provide at most {max} findings. For each research finding, provide:
- A descriptive title
- The main content/information
- The source of the information
- Relevance score (0.0-1.0)

Format your response as JSON:
{{
  "results": [
    {{
      "title": "string",
      "content": "string",
      "url": "string",
      "source": "string",
      "publishedDate": "YYYY-MM-DD",
      "relevance": number
    }}
  ]
}}"#,
        max = filters.max_results(),
    )
}

pub fn summary_prompt(query: &str, findings: &[ResearchFinding]) -> String {
    let top: Vec<&ResearchFinding> = findings.iter().take(DEFAULT_MAX_RESULTS).collect();
    let data = serde_json::to_string(&top).unwrap_or_default();

    format!(
        r#"Summarize the following research findings for the query: "{query}"

Research data:
{data}

Provide a concise but comprehensive summary of these findings."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_fenced_output() {
        let text = "Here you go:\n```json\n{\"results\": [{\"title\": \"A\"}]}\n```\nThanks";
        assert_eq!(extract_json(text), Some("{\"results\": [{\"title\": \"A\"}]}"));
        assert_eq!(extract_json("no braces"), None);
        assert_eq!(extract_json("} backwards {"), None);
    }

    #[test]
    fn test_parse_findings() {
        let text = r#"{"results":[{"title":"EU battery regulation","content":"New labelling rules","source":"EUR-Lex","publishedDate":"2024-02-18","relevance":0.9}]}"#;

        let findings = parse_findings(text).unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, "EU battery regulation");
        assert_eq!(findings[0].published_date.as_deref(), Some("2024-02-18"));
        assert!(findings[0].url.is_none());
    }

    #[test]
    fn test_parse_findings_missing_results_is_empty() {
        assert!(parse_findings("{\"other\": 1}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_findings_rejects_garbage() {
        assert!(matches!(parse_findings("sorry"), Err(NarrativeError::Parse(_))));
        assert!(matches!(parse_findings("{not json}"), Err(NarrativeError::Parse(_))));
    }

    #[test]
    fn test_max_results_default() {
        assert_eq!(ResearchFilters::default().max_results(), 5);
        let filters = ResearchFilters {
            max_results: Some(0),
            ..Default::default()
        };
        assert_eq!(filters.max_results(), 5);
    }

    #[test]
    fn test_prompt_mentions_categories() {
        let filters = ResearchFilters {
            categories: vec!["tariffs".into(), "sanctions".into()],
            max_results: Some(3),
            ..Default::default()
        };
        let prompt = research_prompt("steel exports to US", &filters);
        assert!(prompt.contains("Focus on these categories: tariffs, sanctions"));
        assert!(prompt.contains("at most 3 findings"));
        assert!(prompt.contains("\"results\": ["));
    }
}
