/// Destinations for the rendered sensors panel
use log::{debug, warn};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(test)]
use std::sync::{Arc, Mutex};
use url::Url;

use crate::display::render::escape_html;

/// The `sensors` element: its content is replaced whole on every cycle.
pub trait RenderTarget {
    fn replace(&self, content: String) -> impl Future<Output = Result<(), String>> + Send;
}

/// In-memory target, shared between clones
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    content: Arc<Mutex<String>>,
}

#[cfg(test)]
impl MemoryTarget {
    pub fn new(initial: &str) -> Self {
        MemoryTarget {
            content: Arc::new(Mutex::new(initial.to_string())),
        }
    }

    pub fn content(&self) -> String {
        match self.content.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
impl RenderTarget for MemoryTarget {
    fn replace(&self, content: String) -> impl Future<Output = Result<(), String>> + Send {
        let cell = self.content.clone();
        async move {
            let result = cell
                .lock()
                .map(|mut guard| *guard = content)
                .map_err(|e| format!("Target lock error: {}", e));
            result
        }
    }
}

/// Writes a complete HTML page holding the `sensors` element
///
/// The page is written to a temporary sibling file and renamed into place,
/// so a reader sees either the previous page or the new one.
pub struct FileTarget {
    path: PathBuf,
    server_url: Url,
    writes: AtomicU64,
}

impl FileTarget {
    pub fn new(path: impl AsRef<Path>, server_url: Url) -> Self {
        FileTarget {
            path: path.as_ref().to_path_buf(),
            server_url,
            writes: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove temporary pages left behind by an interrupted write
    ///
    /// # Returns
    /// Number of files removed
    pub async fn remove_stale_temp_files(&self) -> Result<usize, String> {
        let prefix = match self.path.file_name() {
            Some(name) => format!("{}.", name.to_string_lossy()),
            None => return Ok(0),
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| format!("Read dir error for {}: {}", dir.display(), e))?;

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| format!("Read dir error for {}: {}", dir.display(), e))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if !(name.starts_with(&prefix) && name.ends_with(".tmp")) {
                continue;
            }
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => {
                    debug!("Removed stale {}", entry.path().display());
                    removed += 1;
                }
                Err(e) => warn!("Failed to remove {}: {}", entry.path().display(), e),
            }
        }

        Ok(removed)
    }

    fn temp_path(&self) -> PathBuf {
        let n = self.writes.fetch_add(1, Ordering::Relaxed);
        let mut name = self
            .path
            .file_name()
            .map(|s| s.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.{}.tmp", std::process::id(), n));
        self.path.with_file_name(name)
    }
}

impl RenderTarget for FileTarget {
    fn replace(&self, content: String) -> impl Future<Output = Result<(), String>> + Send {
        let page = render_page(&content, &self.server_url);
        let temp = self.temp_path();
        let path = self.path.clone();

        async move {
            tokio::fs::write(&temp, page)
                .await
                .map_err(|e| format!("Write error for {}: {}", temp.display(), e))?;

            if let Err(e) = tokio::fs::rename(&temp, &path).await {
                let _ = tokio::fs::remove_file(&temp).await;
                return Err(format!("Rename error for {}: {}", path.display(), e));
            }
            Ok(())
        }
    }
}

/// Wrap the sensors fragment in the garden page
///
/// Relative `image/...` references resolve against `server_url` via `<base>`.
pub fn render_page(sensors: &str, server_url: &Url) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <base href=\"{}\">\n\
         <link href=\"static/style.css\" rel=\"stylesheet\">\n\
         <title>The IoT Garden</title>\n\
         </head>\n\
         <body>\n\
         <div id=\"title\">The IoT Garden</div>\n\
         <hr/>\n\
         <div id=\"sensors\">{}</div>\n\
         </body>\n\
         </html>\n",
        escape_html(server_url.as_str()),
        sensors
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    fn unique_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "garden-display-{}-{}-{}.html",
            tag,
            std::process::id(),
            crate::utils::now_millis()
        ))
    }

    #[tokio::test]
    async fn test_memory_target_replaces_whole_content() {
        let target = MemoryTarget::new("old");
        let view = target.clone();

        assert_ok!(target.replace("new".to_string()).await);
        assert_eq!(view.content(), "new");
    }

    #[tokio::test]
    async fn test_memory_target_untouched_until_awaited() {
        let target = MemoryTarget::new("old");

        let pending = target.replace("new".to_string());
        drop(pending);
        assert_eq!(target.content(), "old");
    }

    #[test]
    fn test_render_page() {
        let base = Url::parse("http://iotgarden.local:8080/").unwrap();
        let page = render_page("<hr/>", &base);

        assert!(page.contains("<base href=\"http://iotgarden.local:8080/\">"));
        assert!(page.contains("<div id=\"sensors\"><hr/></div>"));
        assert!(page.contains("The IoT Garden"));
    }

    #[tokio::test]
    async fn test_file_target_writes_page() {
        let path = unique_path("write");
        let base = Url::parse("http://127.0.0.1:8080/").unwrap();
        let target = FileTarget::new(&path, base);

        assert_ok!(target.replace("first".to_string()).await);
        assert_ok!(target.replace("second".to_string()).await);

        let page = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(page.contains("<div id=\"sensors\">second</div>"));
        assert!(!page.contains("first"));

        // No temporary files left behind
        let dir = path.parent().unwrap();
        let stem = path.file_name().unwrap().to_string_lossy().to_string();
        let mut entries = tokio::fs::read_dir(dir).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let name = entry.file_name().to_string_lossy().to_string();
            assert!(!(name.starts_with(&stem) && name.ends_with(".tmp")));
        }

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_stale_temp_files_removed() {
        let path = unique_path("stale");
        let target = FileTarget::new(&path, Url::parse("http://localhost/").unwrap());

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        let stale = path.with_file_name(format!("{}.4242.0.tmp", name));
        let unrelated = path.with_file_name(format!("{}.bak", name));
        tokio::fs::write(&stale, "half a page").await.unwrap();
        tokio::fs::write(&unrelated, "keep me").await.unwrap();

        assert_eq!(assert_ok!(target.remove_stale_temp_files().await), 1);
        assert!(tokio::fs::metadata(&stale).await.is_err());
        assert!(tokio::fs::metadata(&unrelated).await.is_ok());

        tokio::fs::remove_file(&unrelated).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_target_missing_directory_fails() {
        let path = std::env::temp_dir()
            .join("garden-display-no-such-dir")
            .join("sensors.html");
        let target = FileTarget::new(&path, Url::parse("http://localhost/").unwrap());

        let err = target.replace("x".to_string()).await.unwrap_err();
        assert!(err.starts_with("Write error"));
    }
}
