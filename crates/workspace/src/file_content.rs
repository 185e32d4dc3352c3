use dendro_domain::{DendroApi, DendroFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Literal(String),
    /// `url:` 间接引用；拉取失败时 `text` 为空
    Remote { url: String, text: Option<String> },
    Missing,
}

impl FileContent {
    pub fn text(&self) -> Option<&str> {
        match self {
            FileContent::Literal(text) => Some(text),
            FileContent::Remote { text, .. } => text.as_deref(),
            FileContent::Missing => None,
        }
    }
}

pub async fn resolve_file_content(api: &dyn DendroApi, file: &DendroFile) -> FileContent {
    if let Some(url) = file.content_url() {
        let text = api.fetch_text(url).await;
        return FileContent::Remote {
            url: url.to_string(),
            text,
        };
    }
    match &file.content {
        Some(content) => FileContent::Literal(content.clone()),
        None => FileContent::Missing,
    }
}
