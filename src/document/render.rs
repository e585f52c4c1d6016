//! Concurrent rendering of every diagram block in a document.

use std::sync::Arc;
use std::time::Duration;

use kroki_blocks_config::{Config, ErrorPresentation};
use tokio::task::JoinSet;

use super::fence::{FencedBlock, Segment, split_fenced_blocks};
use crate::error::RenderError;
use crate::http::Fetcher;
use crate::processor::{ProcessorRegistry, RenderedBlock, html_escape};

/// Extra time a block gets on top of the HTTP timeout before it is abandoned.
pub const BLOCK_GRACE: Duration = Duration::from_secs(5);

/// What happened to one recognised diagram block.
#[derive(Debug)]
pub struct BlockOutcome {
    /// 1-based line of the opening fence.
    pub line: usize,
    /// Block tag as written in the document.
    pub tag: String,
    pub status: BlockStatus,
}

#[derive(Debug)]
pub enum BlockStatus {
    Rendered,
    Failed(RenderError),
}

/// Output of [`DocumentRenderer::render`].
#[derive(Debug, Default)]
pub struct RenderedDocument {
    pub output: String,
    /// One entry per recognised block, in document order.
    pub blocks: Vec<BlockOutcome>,
}

impl RenderedDocument {
    pub fn rendered_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b.status, BlockStatus::Rendered))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&BlockOutcome, &RenderError)> {
        self.blocks.iter().filter_map(|b| match &b.status {
            BlockStatus::Failed(err) => Some((b, err)),
            BlockStatus::Rendered => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Replaces registered diagram blocks in markdown with rendered markup.
pub struct DocumentRenderer {
    registry: Arc<ProcessorRegistry>,
    on_error: ErrorPresentation,
    block_timeout: Duration,
}

impl DocumentRenderer {
    pub fn new(registry: Arc<ProcessorRegistry>) -> Self {
        Self {
            registry,
            on_error: ErrorPresentation::default(),
            block_timeout: Duration::from_secs(kroki_blocks_config::defaults::timeout_secs())
                + BLOCK_GRACE,
        }
    }

    /// Build the registry from `config` and take its error and timeout settings.
    pub fn from_config(config: &Config, fetcher: Arc<dyn Fetcher>) -> Self {
        let registry = ProcessorRegistry::from_config(config, fetcher);
        Self::new(Arc::new(registry))
            .with_on_error(config.on_error)
            .with_block_timeout(Duration::from_secs(config.timeout_secs).saturating_add(BLOCK_GRACE))
    }

    pub fn with_on_error(mut self, on_error: ErrorPresentation) -> Self {
        self.on_error = on_error;
        self
    }

    pub fn with_block_timeout(mut self, timeout: Duration) -> Self {
        self.block_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ProcessorRegistry {
        &self.registry
    }

    /// Render every registered block of `markdown` concurrently.
    ///
    /// Must be called inside a tokio runtime. Blocks with unregistered tags
    /// and all surrounding text pass through unchanged. A block that fails
    /// or times out is handled per the `on_error` setting without affecting
    /// the others.
    pub async fn render(&self, markdown: &str) -> RenderedDocument {
        let segments = split_fenced_blocks(markdown);
        let mut results: Vec<Option<Result<RenderedBlock, RenderError>>> =
            segments.iter().map(|_| None).collect();

        let mut tasks = JoinSet::new();
        for (index, segment) in segments.iter().enumerate() {
            let Segment::Block(block) = segment else {
                continue;
            };
            let Some(processor) = self.registry.get(block.tag) else {
                continue;
            };

            let processor = Arc::clone(processor);
            let source = block.source.to_string();
            let deadline = self.block_timeout;
            tasks.spawn(async move {
                let work = tokio::task::spawn_blocking(move || processor.process(&source));
                let result = match tokio::time::timeout(deadline, work).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(join_err)) => Err(RenderError::TaskFailed(join_err.to_string())),
                    Err(_) => Err(RenderError::Timeout {
                        secs: deadline.as_secs(),
                    }),
                };
                (index, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => log::error!("Diagram render task failed: {e}"),
            }
        }

        let mut document = RenderedDocument {
            output: String::with_capacity(markdown.len()),
            blocks: Vec::new(),
        };

        for (segment, result) in segments.iter().zip(results) {
            let block = match segment {
                Segment::Text(text) => {
                    document.output.push_str(text);
                    continue;
                }
                Segment::Block(block) if !self.registry.is_registered(block.tag) => {
                    document.output.push_str(block.raw);
                    continue;
                }
                Segment::Block(block) => block,
            };

            let result = result.unwrap_or_else(|| {
                Err(RenderError::TaskFailed("render task did not complete".to_string()))
            });
            let status = match result {
                Ok(rendered) => {
                    document.output.push_str(&rendered.html);
                    push_line_break(&mut document.output, block);
                    BlockStatus::Rendered
                }
                Err(err) => {
                    log::warn!(
                        "Failed to render '{}' block at line {}: {err}",
                        block.tag,
                        block.line
                    );
                    self.push_failure(&mut document.output, block, &err);
                    BlockStatus::Failed(err)
                }
            };
            document.blocks.push(BlockOutcome {
                line: block.line,
                tag: block.tag.to_string(),
                status,
            });
        }

        log::info!(
            "Rendered {} of {} diagram block(s)",
            document.rendered_count(),
            document.blocks.len()
        );
        document
    }

    fn push_failure(&self, out: &mut String, block: &FencedBlock<'_>, err: &RenderError) {
        match self.on_error {
            ErrorPresentation::KeepSource => out.push_str(block.raw),
            ErrorPresentation::Placeholder => {
                out.push_str(&format!(
                    "<div class=\"kroki-error\" data-kroki-type=\"{}\" title=\"{}\"></div>",
                    html_escape(block.tag),
                    html_escape(&err.to_string())
                ));
                push_line_break(out, block);
            }
        }
    }
}

/// Keep the line structure the replaced block had.
fn push_line_break(out: &mut String, block: &FencedBlock<'_>) {
    if block.raw.ends_with("\r\n") {
        out.push_str("\r\n");
    } else if block.raw.ends_with('\n') {
        out.push('\n');
    }
}
