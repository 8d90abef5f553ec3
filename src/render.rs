//! Presentation
//!
//! Plain-text transcript output and JSON output. Nothing here interprets
//! payload bytes; it only formats what [`crate::inspect`] produced.

use serde::Serialize;
use std::io::{self, Write};

use crate::inspect::{ChatTranscript, RecordReport};
use crate::message::{AssistantMessage, ChatNode, FunctionCallRecord, Span};
use crate::payload::PayloadDecode;
use crate::store::ChatSummary;
use crate::time::{format_datetime, format_ticks};

const HEAVY_RULE: usize = 50;
const LIGHT_RULE: usize = 30;

/// Writes human-readable transcripts.
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    /// Render into `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// List chats as `ID:` / `Topic:` blocks.
    pub fn chat_list(&mut self, chats: &[ChatSummary]) -> io::Result<()> {
        writeln!(self.out, "Available Chat IDs:")?;
        writeln!(self.out, "{}", "=".repeat(HEAVY_RULE))?;
        for chat in chats {
            writeln!(self.out, "ID: {}", chat.id)?;
            writeln!(
                self.out,
                "Topic: {}",
                chat.topic.as_deref().filter(|t| !t.is_empty()).unwrap_or("No Topic")
            )?;
            writeln!(self.out, "{}", "-".repeat(LIGHT_RULE))?;
        }
        Ok(())
    }

    /// Full transcript of one chat.
    pub fn transcript(&mut self, transcript: &ChatTranscript) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Chat History for ID: {}", transcript.chat_id)?;
        writeln!(self.out, "{}", "=".repeat(HEAVY_RULE))?;
        for report in &transcript.records {
            self.record(report)?;
        }
        Ok(())
    }

    /// One record: header, then its decoded nodes.
    pub fn record(&mut self, report: &RecordReport) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "--- Node {} ---", report.id)?;
        writeln!(
            self.out,
            "Author: {}",
            report.author.as_deref().unwrap_or("Unknown")
        )?;
        writeln!(self.out, "Time: {}", format_ticks(report.created_at))?;
        writeln!(self.out, "{}", "-".repeat(LIGHT_RULE))?;
        self.payload(&report.decoded)
    }

    /// Decoded nodes followed by the failure, if any.
    pub fn payload(&mut self, decoded: &PayloadDecode) -> io::Result<()> {
        for node in &decoded.nodes {
            self.node(node)?;
        }
        if let Some(failure) = &decoded.failure {
            writeln!(self.out, "Error decoding payload: {}", failure.source)?;
            writeln!(self.out, "Raw payload length: {} bytes", failure.length)?;
        }
        Ok(())
    }

    /// One decoded node.
    pub fn node(&mut self, node: &ChatNode) -> io::Result<()> {
        match node {
            ChatNode::System { text } => writeln!(self.out, "System: {}", text),
            ChatNode::User { prompt } => writeln!(self.out, "User: {}", prompt),
            ChatNode::Action { content } => writeln!(self.out, "Action: {}", content),
            ChatNode::Assistant(message) => self.assistant(message),
            ChatNode::FunctionCall(record) => self.function_call(record),
            ChatNode::Unrecognized { kind, body } => writeln!(self.out, "{}: {}", kind, body),
            ChatNode::UnknownTag { tag, body } => writeln!(self.out, "Unknown tag {}: {}", tag, body),
            ChatNode::UnknownShape { value } => writeln!(self.out, "Unknown format: {}", value),
        }
    }

    fn assistant(&mut self, message: &AssistantMessage) -> io::Result<()> {
        for span in &message.spans {
            self.span(span)?;
        }
        if let Some(created_at) = &message.created_at {
            writeln!(self.out, "Started: {}", format_datetime(created_at))?;
        }
        if let Some(finished_at) = &message.finished_at {
            writeln!(self.out, "Finished: {}", format_datetime(finished_at))?;
        }
        let usage = &message.usage;
        if !usage.is_empty() {
            writeln!(
                self.out,
                "Tokens: input {}, output {}, total {}",
                usage.input, usage.output, usage.total
            )?;
        }
        Ok(())
    }

    fn span(&mut self, span: &Span) -> io::Result<()> {
        if let Some(content) = &span.content {
            writeln!(self.out, "Assistant: {}", content)?;
        }
        if let Some(reasoning) = &span.reasoning {
            writeln!(self.out, "Reasoning: {}", reasoning)?;
        }
        for record in &span.function_calls {
            self.function_call(record)?;
        }
        for value in &span.unrecognized {
            writeln!(self.out, "Unknown format: {}", value)?;
        }
        Ok(())
    }

    fn function_call(&mut self, record: &FunctionCallRecord) -> io::Result<()> {
        if let Some(content) = &record.content {
            writeln!(self.out, "Tool content: {}", content)?;
        }
        for call in &record.calls {
            writeln!(self.out, "Tool call: {}", call.name)?;
            let arguments = serde_json::to_string_pretty(&call.arguments).map_err(io::Error::from)?;
            writeln!(self.out, "Arguments: {}", arguments)?;
        }
        for result in &record.results {
            writeln!(self.out, "Tool result: {}", result.value.display_text())?;
        }
        Ok(())
    }
}

/// Write any report as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(mut out: W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut out, value).map_err(io::Error::from)?;
    writeln!(out)
}
