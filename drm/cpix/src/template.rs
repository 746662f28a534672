use quick_xml::escape::escape;

use crate::error::{CpixError, CpixResult};
use crate::request::AssetKeyRequest;

/**
    A CPIX request template with `{{content_id}}` and `{{key_id}}`
    placeholders. Substituted values are XML-escaped.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template<'a> {
    source: &'a str,
}

impl<'a> Template<'a> {
    pub const fn new(source: &'a str) -> Self {
        Self { source }
    }

    /**
        Render the template for the given asset.
    */
    pub fn render(&self, req: &AssetKeyRequest) -> CpixResult<String> {
        let mut out = String::with_capacity(self.source.len() + 64);
        let mut rest = self.source;
        let mut offset = 0;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);

            let inner = &rest[start + 2..];
            let end = inner
                .find("}}")
                .ok_or(CpixError::UnterminatedPlaceholder(offset + start))?;

            let value = match inner[..end].trim() {
                "content_id" => req.content_id.as_str(),
                "key_id" => req.key_id.as_str(),
                other => return Err(CpixError::UnknownPlaceholder(other.to_owned())),
            };
            out.push_str(&escape(value));

            let consumed = start + 2 + end + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }

        out.push_str(rest);
        Ok(out)
    }
}
