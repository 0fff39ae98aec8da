use crate::core::error::ChatError;
use crate::providers::Fragment;
use futures::{Stream, StreamExt};

/// Where a streaming reply is drawn.
///
/// `render` always receives the whole reply so far, so a surface that can
/// only replace its contents works as well as one that appends.
pub trait DisplaySurface {
    fn render(&mut self, text: &str);

    /// Called once the reply is complete or has been cut short.
    fn finish(&mut self, text: &str);

    fn show_error(&mut self, error: &ChatError);
}

/// Result of draining one completion stream.
#[derive(Debug)]
pub struct StreamOutcome {
    pub text: String,
    pub error: Option<ChatError>,
}

/// Drains `stream` in arrival order, rendering the running reply after every
/// fragment that carries text.
///
/// Stops at the first error and keeps whatever text arrived before it.
pub async fn accumulate<S, D>(mut stream: S, surface: &mut D) -> StreamOutcome
where
    S: Stream<Item = Result<Fragment, ChatError>> + Unpin,
    D: DisplaySurface + ?Sized,
{
    let mut text = String::new();

    while let Some(item) = stream.next().await {
        match item {
            Ok(Fragment { text: Some(piece) }) if !piece.is_empty() => {
                text.push_str(&piece);
                surface.render(&text);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, received = text.len(), "stream ended early");
                return StreamOutcome {
                    text,
                    error: Some(e),
                };
            }
        }
    }

    StreamOutcome { text, error: None }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use futures::stream;

    /// Records everything drawn on it.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub renders: Vec<String>,
        pub finished: Vec<String>,
        pub errors: Vec<String>,
    }

    impl DisplaySurface for RecordingSurface {
        fn render(&mut self, text: &str) {
            self.renders.push(text.to_string());
        }

        fn finish(&mut self, text: &str) {
            self.finished.push(text.to_string());
        }

        fn show_error(&mut self, error: &ChatError) {
            self.errors.push(error.to_string());
        }
    }

    fn fragments(
        items: Vec<Result<Fragment, ChatError>>,
    ) -> impl Stream<Item = Result<Fragment, ChatError>> + Unpin {
        stream::iter(items)
    }

    #[tokio::test]
    async fn renders_running_text_after_each_fragment() {
        let mut surface = RecordingSurface::default();
        let outcome = accumulate(
            fragments(vec![
                Ok(Fragment::text("Hel")),
                Ok(Fragment::text("lo, ")),
                Ok(Fragment::text("world")),
            ]),
            &mut surface,
        )
        .await;

        assert_eq!(outcome.text, "Hello, world");
        assert!(outcome.error.is_none());
        assert_eq!(surface.renders, vec!["Hel", "Hello, ", "Hello, world"]);
    }

    #[tokio::test]
    async fn skips_fragments_without_text() {
        let mut surface = RecordingSurface::default();
        let outcome = accumulate(
            fragments(vec![
                Ok(Fragment::empty()),
                Ok(Fragment::text("4")),
                Ok(Fragment::text("")),
                Ok(Fragment::empty()),
            ]),
            &mut surface,
        )
        .await;

        assert_eq!(outcome.text, "4");
        assert_eq!(surface.renders, vec!["4"]);
    }

    #[tokio::test]
    async fn keeps_partial_text_on_error() {
        let mut surface = RecordingSurface::default();
        let outcome = accumulate(
            fragments(vec![
                Ok(Fragment::text("Par")),
                Ok(Fragment::text("tial")),
                Err(ChatError::Transport("connection reset".into())),
                Ok(Fragment::text("never seen")),
            ]),
            &mut surface,
        )
        .await;

        assert_eq!(outcome.text, "Partial");
        assert!(matches!(outcome.error, Some(ChatError::Transport(_))));
        assert_eq!(surface.renders, vec!["Par", "Partial"]);
    }

    #[tokio::test]
    async fn empty_stream_yields_empty_reply() {
        let mut surface = RecordingSurface::default();
        let outcome = accumulate(fragments(Vec::new()), &mut surface).await;

        assert_eq!(outcome.text, "");
        assert!(outcome.error.is_none());
        assert!(surface.renders.is_empty());
    }
}
