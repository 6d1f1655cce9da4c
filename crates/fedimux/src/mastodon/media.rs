// Mastodon-dialect media operations
//
// Uploads go to the async v2 endpoint; a 202 means the attachment is still
// processing but its id is already valid for `media_ids`.

use serde_json::json;
use tracing::debug;

use super::client::Client;
use super::{convert, entities as native};
use crate::capability::Operation;
use crate::entities::Attachment;
use crate::error::Error;

impl Client {
    /// Upload a media file.
    ///
    /// `POST /api/v2/media` (multipart)
    pub async fn upload_media(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        description: Option<&str>,
    ) -> Result<Attachment, Error> {
        self.gate(Operation::UploadMedia)?;
        debug!(file_name, size = bytes.len(), "uploading media");

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(description) = description {
            form = form.text("description", description.to_string());
        }

        let a: native::Attachment = self.post_multipart("/api/v2/media", form).await?;
        Ok(convert::attachment(a))
    }

    /// Update an attachment's description.
    ///
    /// `PUT /api/v1/media/{id}`
    pub async fn update_media(
        &self,
        id: &str,
        description: &str,
    ) -> Result<Attachment, Error> {
        self.gate(Operation::UpdateMedia)?;
        debug!(id, "updating media description");
        let a: native::Attachment = self
            .put(
                &format!("/api/v1/media/{id}"),
                &json!({ "description": description }),
            )
            .await?;
        Ok(convert::attachment(a))
    }
}
