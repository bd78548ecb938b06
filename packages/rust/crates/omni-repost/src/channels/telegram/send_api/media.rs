use reqwest::multipart::{Form, Part};

use crate::delivery::DeliveryError;
use crate::post::Document;

use super::super::TelegramChannel;
use super::super::error::TelegramApiError;

struct DocumentFilePart {
    field_name: String,
    file_name: String,
    file_bytes: Vec<u8>,
}

impl TelegramChannel {
    /// Upload local documents: `sendDocument` for one, a multipart
    /// `sendMediaGroup` for several.
    ///
    /// An unreadable file is a permanent failure; retrying cannot fix it.
    pub(in crate::channels::telegram) async fn send_documents(
        &self,
        documents: &[Document],
    ) -> Result<(), DeliveryError> {
        let mut parts = Vec::with_capacity(documents.len());
        for (index, document) in documents.iter().enumerate() {
            parts.push(Self::read_document_part(index, document).await?);
        }

        let result = match parts.as_slice() {
            [] => return Ok(()),
            [single] => self.send_document_once(single).await,
            _ => self.send_document_group_once(&parts).await,
        };
        result.map_err(TelegramApiError::into_delivery_error)
    }

    async fn read_document_part(
        index: usize,
        document: &Document,
    ) -> Result<DocumentFilePart, DeliveryError> {
        let field_name = format!("file{index}");
        let file_name = document
            .local_path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| {
                let title = document.title.trim();
                if title.is_empty() {
                    field_name.clone()
                } else {
                    title.to_string()
                }
            });
        let file_bytes = tokio::fs::read(&document.local_path)
            .await
            .map_err(|error| {
                DeliveryError::permanent(format!(
                    "failed to read local document {}: {error}",
                    document.local_path.display()
                ))
            })?;
        Ok(DocumentFilePart {
            field_name,
            file_name,
            file_bytes,
        })
    }

    async fn send_document_once(&self, part: &DocumentFilePart) -> Result<(), TelegramApiError> {
        let file_part = Part::bytes(part.file_bytes.clone()).file_name(part.file_name.clone());
        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .part("document", file_part);
        self.send_multipart_once("sendDocument", form).await
    }

    async fn send_document_group_once(
        &self,
        parts: &[DocumentFilePart],
    ) -> Result<(), TelegramApiError> {
        let media: Vec<serde_json::Value> = parts
            .iter()
            .map(|part| {
                serde_json::json!({
                    "type": "document",
                    "media": format!("attach://{}", part.field_name),
                })
            })
            .collect();
        let media = serde_json::to_string(&media).map_err(|error| TelegramApiError {
            status: Some(reqwest::StatusCode::BAD_REQUEST),
            error_code: None,
            retry_after_secs: None,
            body: format!("failed to encode sendMediaGroup payload: {error}"),
        })?;

        let mut form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("media", media);
        for part in parts {
            let file_part = Part::bytes(part.file_bytes.clone()).file_name(part.file_name.clone());
            form = form.part(part.field_name.clone(), file_part);
        }
        self.send_multipart_once("sendMediaGroup", form).await
    }

    async fn send_multipart_once(&self, method: &str, form: Form) -> Result<(), TelegramApiError> {
        tracing::debug!(method, chat_id = %self.chat_id, "Telegram multipart request");
        let response = self
            .client
            .post(self.api_url(method))
            .multipart(form)
            .send()
            .await
            .map_err(TelegramApiError::from_reqwest)?;
        Self::validate_telegram_response(response).await
    }
}
