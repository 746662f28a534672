use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{CpixError, CpixResult};

/**
    A key provider's CPIX reply, reduced to the fields the proxy uses.

    Elements and attributes are matched by local name, so documents with or
    without namespace prefixes parse alike. Anything not listed here is
    ignored. Values are whitespace-trimmed but otherwise not validated.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpixDocument {
    /**
        `CPIX@contentId`
    */
    pub content_id: String,
    /**
        First `ContentKeyList/ContentKey`. Left empty when the reply has none.
    */
    pub content_key: ContentKey,
    /**
        `DRMSystemList/DRMSystem` entries in document order.
    */
    pub drm_systems: Vec<DrmSystem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentKey {
    pub kid: String,
    pub explicit_iv: String,
    /**
        `Data/Secret/PlainValue`, the key exactly as the provider sent it.
    */
    pub plain_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrmSystem {
    pub system_id: String,
    pub kid: String,
    pub uri_ext_x_key: String,
    pub key_format: String,
    pub key_format_versions: String,
    pub pssh: String,
    pub content_protection_data: String,
}

impl DrmSystem {
    /**
        Whether the provider attached protection data for this system.
    */
    pub fn has_protection_data(&self) -> bool {
        !self.content_protection_data.is_empty()
    }

    /**
        The PSSH payload for this system: the `PSSH` element, or
        `ContentProtectionData` when the provider left `PSSH` out.
    */
    pub fn pssh_payload(&self) -> &str {
        if self.pssh.is_empty() {
            &self.content_protection_data
        } else {
            &self.pssh
        }
    }

    fn trim(&mut self) {
        for field in [
            &mut self.system_id,
            &mut self.kid,
            &mut self.uri_ext_x_key,
            &mut self.key_format,
            &mut self.key_format_versions,
            &mut self.pssh,
            &mut self.content_protection_data,
        ] {
            trim_in_place(field);
        }
    }
}

impl CpixDocument {
    /**
        Parse a CPIX document. Fails if the bytes are not well-formed XML or
        the root element is not `CPIX`.
    */
    pub fn parse(xml: &[u8]) -> CpixResult<Self> {
        let xml = std::str::from_utf8(xml).map_err(|e| CpixError::InvalidUtf8(e.to_string()))?;
        let mut reader = Reader::from_str(xml);
        let mut builder = DocumentBuilder::default();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = builder.open(&e)?;
                    builder.path.push(name);
                }
                Ok(Event::Empty(e)) => {
                    builder.open(&e)?;
                }
                Ok(Event::End(_)) => {
                    builder.path.pop();
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| CpixError::InvalidXml(e.to_string()))?;
                    builder.text(&text);
                }
                Ok(Event::CData(e)) => {
                    let raw = e.into_inner();
                    let text = std::str::from_utf8(&raw)
                        .map_err(|e| CpixError::InvalidUtf8(e.to_string()))?;
                    builder.text(text);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(CpixError::InvalidXml(e.to_string())),
                _ => {}
            }
        }

        builder.finish()
    }
}

#[derive(Default)]
struct DocumentBuilder {
    doc: CpixDocument,
    path: Vec<String>,
    content_keys: usize,
    seen_root: bool,
}

impl DocumentBuilder {
    /**
        Handle an opening (or self-closing) element and return its local name.
    */
    fn open(&mut self, e: &BytesStart<'_>) -> CpixResult<String> {
        let qname = e.name();
        let name = String::from_utf8_lossy(local_name(qname.as_ref())).into_owned();

        if self.path.is_empty() {
            if self.seen_root {
                return Err(CpixError::InvalidXml(format!(
                    "unexpected second root element <{name}>"
                )));
            }
            if name != "CPIX" {
                return Err(CpixError::UnexpectedRoot(name));
            }
            self.seen_root = true;
            for (key, value) in attributes(e)? {
                if key == "contentId" {
                    self.doc.content_id = value;
                }
            }
            return Ok(name);
        }

        let parent = self.path.last().map(String::as_str);
        match (parent, name.as_str()) {
            (Some("ContentKeyList"), "ContentKey") => {
                self.content_keys += 1;
                if self.content_keys == 1 {
                    for (key, value) in attributes(e)? {
                        match key.as_str() {
                            "kid" => self.doc.content_key.kid = value,
                            "explicitIV" => self.doc.content_key.explicit_iv = value,
                            _ => {}
                        }
                    }
                }
            }
            (Some("DRMSystemList"), "DRMSystem") => {
                let mut system = DrmSystem::default();
                for (key, value) in attributes(e)? {
                    match key.as_str() {
                        "systemId" => system.system_id = value,
                        "kid" => system.kid = value,
                        _ => {}
                    }
                }
                self.doc.drm_systems.push(system);
            }
            _ => {}
        }

        Ok(name)
    }

    fn text(&mut self, text: &str) {
        let path: Vec<&str> = self.path.iter().map(String::as_str).collect();
        match path.as_slice() {
            [.., "ContentKey", "Data", "Secret", "PlainValue"] if self.content_keys == 1 => {
                self.doc.content_key.plain_value.push_str(text);
            }
            [.., "DRMSystemList", "DRMSystem", field] => {
                let Some(system) = self.doc.drm_systems.last_mut() else {
                    return;
                };
                let target = match *field {
                    "URIExtXKey" => &mut system.uri_ext_x_key,
                    "KeyFormat" => &mut system.key_format,
                    "KeyFormatVersions" => &mut system.key_format_versions,
                    "PSSH" => &mut system.pssh,
                    "ContentProtectionData" => &mut system.content_protection_data,
                    _ => return,
                };
                target.push_str(text);
            }
            _ => {}
        }
    }

    fn finish(mut self) -> CpixResult<CpixDocument> {
        if let Some(open) = self.path.pop() {
            return Err(CpixError::UnexpectedEof(open));
        }
        if !self.seen_root {
            return Err(CpixError::MissingRoot);
        }

        let doc = &mut self.doc;
        trim_in_place(&mut doc.content_id);
        trim_in_place(&mut doc.content_key.kid);
        trim_in_place(&mut doc.content_key.explicit_iv);
        trim_in_place(&mut doc.content_key.plain_value);
        doc.drm_systems.iter_mut().for_each(DrmSystem::trim);

        Ok(self.doc)
    }
}

fn attributes(e: &BytesStart<'_>) -> CpixResult<Vec<(String, String)>> {
    e.attributes()
        .map(|attr| {
            let attr = attr.map_err(|e| CpixError::InvalidXml(e.to_string()))?;
            let key = String::from_utf8_lossy(local_name(attr.key.as_ref())).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| CpixError::InvalidXml(e.to_string()))?
                .into_owned();
            Ok((key, value))
        })
        .collect()
}

/**
    Extract the local name from a possibly namespace-prefixed tag.
*/
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

fn trim_in_place(s: &mut String) {
    let trimmed = s.trim();
    if trimmed.len() != s.len() {
        *s = trimmed.to_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROVIDER_REPLY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<cpix:CPIX xmlns:cpix="urn:dashif:org:cpix" xmlns:pskc="urn:ietf:params:xml:ns:keyprov:pskc" contentId="asset-1">
    <cpix:ContentKeyList>
        <cpix:ContentKey kid="86f13e28-eded-4e58-946f-67c51ddd09e4" explicitIV="AAECAwQFBgcICQoLDA0ODw==">
            <cpix:Data>
                <pskc:Secret>
                    <pskc:PlainValue>
                        q83vASNFZ4mrze8BI0VniQ==
                    </pskc:PlainValue>
                </pskc:Secret>
            </cpix:Data>
        </cpix:ContentKey>
    </cpix:ContentKeyList>
    <cpix:DRMSystemList>
        <cpix:DRMSystem systemId="94ce86fb-07ff-4f43-adb8-93d2fa968ca2" kid="86f13e28-eded-4e58-946f-67c51ddd09e4">
            <cpix:URIExtXKey>c2tkOi8vYXNzZXQtMQ==</cpix:URIExtXKey>
            <cpix:KeyFormat>Y29tLmFwcGxlLnN0cmVhbWluZ2tleWRlbGl2ZXJ5</cpix:KeyFormat>
            <cpix:KeyFormatVersions>MQ==</cpix:KeyFormatVersions>
        </cpix:DRMSystem>
        <cpix:DRMSystem systemId="9a04f079-9840-4286-ab92-e65be0885f95" kid="86f13e28-eded-4e58-946f-67c51ddd09e4">
            <cpix:PSSH>cGxheXJlYWR5</cpix:PSSH>
            <cpix:ContentProtectionData>cHJvLWRhdGE=</cpix:ContentProtectionData>
        </cpix:DRMSystem>
        <cpix:DRMSystem systemId="edef8ba9-79d6-4ace-a3c8-27dcd51d21ed" kid="86f13e28-eded-4e58-946f-67c51ddd09e4">
            <cpix:PSSH>d2lkZXZpbmU=</cpix:PSSH>
            <cpix:ContentProtectionData>d3YtZGF0YQ==</cpix:ContentProtectionData>
            <cpix:HLSSignalingData playlist="media">ignored</cpix:HLSSignalingData>
        </cpix:DRMSystem>
    </cpix:DRMSystemList>
</cpix:CPIX>"#;

    #[test]
    fn parses_prefixed_provider_reply() {
        let doc = CpixDocument::parse(PROVIDER_REPLY.as_bytes()).unwrap();
        assert_eq!(doc.content_id, "asset-1");
        assert_eq!(
            doc.content_key,
            ContentKey {
                kid: "86f13e28-eded-4e58-946f-67c51ddd09e4".into(),
                explicit_iv: "AAECAwQFBgcICQoLDA0ODw==".into(),
                plain_value: "q83vASNFZ4mrze8BI0VniQ==".into(),
            }
        );
        assert_eq!(doc.drm_systems.len(), 3);

        let fairplay = &doc.drm_systems[0];
        assert_eq!(fairplay.system_id, "94ce86fb-07ff-4f43-adb8-93d2fa968ca2");
        assert_eq!(fairplay.uri_ext_x_key, "c2tkOi8vYXNzZXQtMQ==");
        assert_eq!(fairplay.key_format_versions, "MQ==");
        assert!(!fairplay.has_protection_data());

        let widevine = &doc.drm_systems[2];
        assert_eq!(widevine.pssh, "d2lkZXZpbmU=");
        assert_eq!(widevine.content_protection_data, "d3YtZGF0YQ==");
        assert!(widevine.has_protection_data());
        assert_eq!(widevine.pssh_payload(), "d2lkZXZpbmU=");
    }

    #[test]
    fn parses_unprefixed_reply() {
        let xml = r#"<CPIX><ContentKeyList><ContentKey kid="" explicitIV="someIV"><Data><Secret><PlainValue>someKey</PlainValue></Secret></Data></ContentKey></ContentKeyList><DRMSystemList></DRMSystemList></CPIX>"#;
        let doc = CpixDocument::parse(xml.as_bytes()).unwrap();
        assert_eq!(doc.content_key.plain_value, "someKey");
        assert_eq!(doc.content_key.explicit_iv, "someIV");
        assert!(doc.drm_systems.is_empty());
    }

    #[test]
    fn self_closing_systems_are_recorded() {
        let xml = r#"<CPIX><DRMSystemList><DRMSystem systemId="a"/><DRMSystem systemId="b"/></DRMSystemList></CPIX>"#;
        let doc = CpixDocument::parse(xml.as_bytes()).unwrap();
        let ids: Vec<_> = doc.drm_systems.iter().map(|s| s.system_id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn entities_and_cdata_are_decoded() {
        let xml = r#"<CPIX contentId="a&amp;b"><ContentKeyList><ContentKey><Data><Secret><PlainValue><![CDATA[k<1>]]></PlainValue></Secret></Data></ContentKey></ContentKeyList></CPIX>"#;
        let doc = CpixDocument::parse(xml.as_bytes()).unwrap();
        assert_eq!(doc.content_id, "a&b");
        assert_eq!(doc.content_key.plain_value, "k<1>");
    }

    #[test]
    fn only_first_content_key_is_used() {
        let xml = r#"<CPIX><ContentKeyList>
            <ContentKey kid="first" explicitIV="iv1"><Data><Secret><PlainValue>k1</PlainValue></Secret></Data></ContentKey>
            <ContentKey kid="second" explicitIV="iv2"><Data><Secret><PlainValue>k2</PlainValue></Secret></Data></ContentKey>
        </ContentKeyList></CPIX>"#;
        let doc = CpixDocument::parse(xml.as_bytes()).unwrap();
        assert_eq!(doc.content_key.kid, "first");
        assert_eq!(doc.content_key.plain_value, "k1");
    }

    #[test]
    fn missing_content_key_leaves_fields_empty() {
        let doc = CpixDocument::parse(b"<CPIX/>").unwrap();
        assert_eq!(doc, CpixDocument::default());
    }

    #[test]
    fn pssh_payload_falls_back_to_protection_data() {
        let system = DrmSystem {
            content_protection_data: "cpd".into(),
            ..Default::default()
        };
        assert_eq!(system.pssh_payload(), "cpd");
    }

    #[test]
    fn rejects_wrong_root() {
        let err = CpixDocument::parse(b"<html><body/></html>").unwrap_err();
        assert_eq!(err, CpixError::UnexpectedRoot("html".into()));
    }

    #[test]
    fn rejects_non_xml() {
        let err = CpixDocument::parse(b"Internal Server Error").unwrap_err();
        assert_eq!(err, CpixError::MissingRoot);
        let err = CpixDocument::parse(b"").unwrap_err();
        assert_eq!(err, CpixError::MissingRoot);
    }

    #[test]
    fn rejects_truncated_document() {
        let err = CpixDocument::parse(b"<CPIX><ContentKeyList>").unwrap_err();
        assert!(
            matches!(err, CpixError::UnexpectedEof(_) | CpixError::InvalidXml(_)),
            "{err:?}"
        );
    }

    #[test]
    fn rejects_mismatched_tags() {
        let err = CpixDocument::parse(b"<CPIX><ContentKeyList></DRMSystemList></CPIX>").unwrap_err();
        assert!(matches!(err, CpixError::InvalidXml(_)));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = CpixDocument::parse(&[b'<', 0xff, 0xfe, b'>']).unwrap_err();
        assert!(matches!(err, CpixError::InvalidUtf8(_)));
    }

    #[test]
    fn local_name_strips_prefix() {
        assert_eq!(local_name(b"PSSH"), b"PSSH");
        assert_eq!(local_name(b"cpix:PSSH"), b"PSSH");
    }
}
