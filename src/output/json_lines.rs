use crate::article::Article;
use crate::output::ArticleSink;
use crate::OutputResult;
use async_trait::async_trait;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Writes one JSON record per line
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl JsonLinesSink<std::io::Stdout> {
    /// A sink that prints records to standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<W: Write + Send> ArticleSink for JsonLinesSink<W> {
    async fn deliver(&self, article: &Article) -> OutputResult<()> {
        let line = article.to_json()?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::ArticleRecord;
    use crate::crawler::Page;
    use crate::url::canonicalize;

    fn article(path: &str, title: &str) -> Article {
        let html = format!(
            r#"<html><head><meta property="article:section" content="UK"></head>
            <body><h1>{}</h1><time datetime="2021-03-04T10:00:00Z"></time>
            <article><div data-component="text-block">Body</div></article></body></html>"#,
            title
        );
        let page = Page::parse(&html, canonicalize(&format!("https://site.example{}", path)));
        Article::assemble(&page).unwrap()
    }

    #[tokio::test]
    async fn test_writes_one_record_per_line() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.deliver(&article("/news/a-11", "First")).await.unwrap();
        sink.deliver(&article("/news/b-22", "Second")).await.unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let records: Vec<ArticleRecord> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "First");
        assert_eq!(records[1].url, "https://site.example/news/b-22");
        assert_eq!(records[1].paragraphs, vec!["Body"]);
    }
}
