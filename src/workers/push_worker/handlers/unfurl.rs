use crate::common::error::ServiceResult;
use crate::common::state::AppState;
use crate::entities::jobs::UnfurlJob;
use crate::repositories::unfurl::{self, UrlMetadata};
use std::time::Duration;
use tracing::debug;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches a linked page and caches its title/description/image so link
/// previews render without a client-side fetch.
pub async fn handle(ctx: &AppState, job: &UnfurlJob) -> ServiceResult<()> {
    if unfurl::cache_get(ctx, &job.url).await?.is_some() {
        debug!(url = job.url, "unfurl already cached");
        return Ok(());
    }

    let html = reqwest::Client::new()
        .get(&job.url)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let metadata = UrlMetadata {
        url: job.url.clone(),
        title: meta_content(&html, "og:title").or_else(|| title_tag(&html)),
        description: meta_content(&html, "og:description"),
        image: meta_content(&html, "og:image"),
    };
    unfurl::cache_set(ctx, &metadata).await?;
    debug!(url = job.url, title = metadata.title, "cached unfurl metadata");
    Ok(())
}

/// Pulls the content attribute of an open-graph meta tag without a full
/// HTML parse; pages that do not follow the property-then-content attribute
/// order simply yield nothing.
fn meta_content(html: &str, property: &str) -> Option<String> {
    let marker = format!("property=\"{property}\"");
    let tag_start = html.find(&marker)?;
    let rest = &html[tag_start..];
    let tag_end = rest.find('>')?;
    let tag = &rest[..tag_end];
    let content_start = tag.find("content=\"")? + "content=\"".len();
    let content = &tag[content_start..];
    let content_end = content.find('"')?;
    non_empty(&content[..content_end])
}

fn title_tag(html: &str) -> Option<String> {
    let start = html.find("<title>")? + "<title>".len();
    let rest = &html[start..];
    let end = rest.find("</title>")?;
    non_empty(rest[..end].trim())
}

fn non_empty(value: &str) -> Option<String> {
    match value.is_empty() {
        true => None,
        false => Some(value.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head>
        <title>Fallback Title</title>
        <meta property="og:title" content="A Shared Post" />
        <meta property="og:description" content="Something worth reading" />
        <meta property="og:image" content="https://cdn.example.com/p.jpg" />
        </head><body></body></html>"#;

    #[test]
    fn extracts_open_graph_tags() {
        assert_eq!(meta_content(PAGE, "og:title").as_deref(), Some("A Shared Post"));
        assert_eq!(
            meta_content(PAGE, "og:description").as_deref(),
            Some("Something worth reading")
        );
        assert_eq!(
            meta_content(PAGE, "og:image").as_deref(),
            Some("https://cdn.example.com/p.jpg")
        );
    }

    #[test]
    fn falls_back_to_title_tag() {
        let html = "<html><head><title> Plain Page </title></head></html>";
        assert_eq!(meta_content(html, "og:title"), None);
        assert_eq!(title_tag(html).as_deref(), Some("Plain Page"));
    }

    #[test]
    fn missing_tags_yield_none() {
        let html = "<html><body>no head</body></html>";
        assert_eq!(meta_content(html, "og:title"), None);
        assert_eq!(title_tag(html), None);
    }
}
