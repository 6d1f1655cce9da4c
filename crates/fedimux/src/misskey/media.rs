// Misskey-dialect media operations
//
// Media lives in the drive; an uploaded file's id is immediately valid for
// `fileIds` on a new note. Attachment descriptions map to the drive file's
// `comment`.

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
    /// `POST /api/drive/files/create` (multipart)
    pub async fn upload_media(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        description: Option<&str>,
    ) -> Result<Attachment, Error> {
        self.gate(Operation::UploadMedia)?;
        debug!(file_name, size = bytes.len(), "uploading media");

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("name", file_name.to_string());
        if let Some(description) = description {
            form = form.text("comment", description.to_string());
        }

        let f: native::DriveFile = self.api_multipart("drive/files/create", form).await?;
        Ok(convert::attachment(&f))
    }

    /// Update an attachment's description.
    ///
    /// `POST /api/drive/files/update`
    pub async fn update_media(&self, id: &str, description: &str) -> Result<Attachment, Error> {
        self.gate(Operation::UpdateMedia)?;
        debug!(id, "updating media description");
        let f: native::DriveFile = self
            .api(
                "drive/files/update",
                json!({ "fileId": id, "comment": description }),
            )
            .await?;
        Ok(convert::attachment(&f))
    }
}
