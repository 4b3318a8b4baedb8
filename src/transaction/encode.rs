//! transaction::encode
//!
//! Multipart rendering of a transaction into its wire payload.
//!
//! # Layout
//!
//! The payload opens with a preamble declaring the multipart content type
//! and the boundary token, followed by one part per protocol step: a
//! `begin` part naming the source commit, one part per appended action in
//! append order, and a closing `commit` part with the target ref and
//! authorship. Each part is a `Content-Type` header line, a blank line,
//! and a JSON body; parts are joined by the boundary delimiter and the
//! payload ends with the terminal boundary.
//!
//! Bundling the action log and commit metadata this way keeps the whole
//! changeset in one atomic request while leaving every JSON body
//! independently parseable server-side.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{Action, CommitMeta};
use crate::core::types::CommitId;

/// Fixed boundary token separating payload parts.
pub const BOUNDARY: &str = "ae886cbbf75255ec4ba1b1b1e7bbd7a8";

/// Content type of each individual part.
pub const PART_CONTENT_TYPE: &str = "application/json";

/// Overall content type the payload is submitted under.
pub const PAYLOAD_CONTENT_TYPE: &str = "multipart/mixed";

/// One part of the multipart payload: a content type and a rendered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Value of the part's Content-Type header line.
    pub content_type: &'static str,
    /// The part body (a JSON document).
    pub body: String,
}

impl Part {
    fn json<T: Serialize>(body: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            content_type: PART_CONTENT_TYPE,
            body: serde_json::to_string(body)?,
        })
    }

    /// Render as header line, blank line, body.
    pub fn render(&self) -> String {
        format!("Content-Type: {}\n\n{}", self.content_type, self.body)
    }
}

#[derive(Serialize)]
struct BeginBody<'a> {
    action: &'static str,
    source: &'a str,
}

#[derive(Serialize)]
struct CreateBody<'a> {
    action: &'static str,
    id: usize,
    class: &'a str,
    properties: &'a Map<String, Value>,
}

#[derive(Serialize)]
struct ObjectPointer<'a> {
    uuid: &'a str,
}

#[derive(Serialize)]
struct UpdateBody<'a> {
    action: &'static str,
    id: usize,
    object: ObjectPointer<'a>,
    properties: &'a Map<String, Value>,
}

#[derive(Serialize)]
struct CommitBody<'a> {
    action: &'static str,
    target: &'a str,
    author: &'a str,
    #[serde(rename = "author-date")]
    author_date: String,
    committer: &'a str,
    #[serde(rename = "committer-date")]
    committer_date: String,
    message: &'a str,
}

/// The `begin` part naming the source commit.
pub(super) fn begin_part(source: &CommitId) -> Result<Part, serde_json::Error> {
    Part::json(&BeginBody {
        action: "begin",
        source: source.as_str(),
    })
}

/// One action part, tagged `create` or `update` and carrying its id.
pub(super) fn action_part(action: &Action) -> Result<Part, serde_json::Error> {
    match action {
        Action::Create {
            id,
            klass,
            properties,
        } => Part::json(&CreateBody {
            action: "create",
            id: *id,
            class: klass,
            properties,
        }),
        Action::Update {
            id,
            uuid,
            properties,
        } => Part::json(&UpdateBody {
            action: "update",
            id: *id,
            object: ObjectPointer { uuid },
            properties,
        }),
    }
}

/// The closing `commit` part. The author doubles as committer and both
/// dates share one timestamp; distinct committer identity is not
/// supported by this layer.
pub(super) fn commit_part(meta: &CommitMeta) -> Result<Part, serde_json::Error> {
    let date = meta.timestamp.to_wire();
    Part::json(&CommitBody {
        action: "commit",
        target: meta.target.as_str(),
        author: &meta.author,
        author_date: date.clone(),
        committer: &meta.author,
        committer_date: date,
        message: &meta.message,
    })
}

/// Join parts into the complete payload: preamble, delimited parts,
/// terminal boundary.
pub(super) fn render_payload(parts: &[Part]) -> String {
    let mut payload = format!("Content-Type: {PAYLOAD_CONTENT_TYPE}; boundary={BOUNDARY}\n\n");
    for part in parts {
        payload.push_str(&format!("--{BOUNDARY}\n"));
        payload.push_str(&part.render());
        payload.push('\n');
    }
    payload.push_str(&format!("--{BOUNDARY}--\n"));
    payload
}
