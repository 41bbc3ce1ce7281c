//! YADIS discovery of OpenID 2.0 provider endpoints.

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use reqwest::header::ACCEPT;
use tracing::debug;
use url::Url;

use crate::error::{discovery_error, discovery_error_from, DiscoveryErrorKind, Error};
use crate::http::{read_success_body, HttpClient};

/// XML namespace of the `<XRD>` elements inside an XRDS document.
pub const XRD_NAMESPACE: &str = "xri://$xrd*($v*2.0)";

const XRDS_CONTENT_TYPE: &str = "application/xrds+xml";
const XRDS_LOCATION_HEADER: &str = "x-xrds-location";

/// Endpoints discovered by every `YadisDiscovery` in the process, keyed by identifier.
static ENDPOINT_CACHE: LazyLock<Arc<DashMap<String, Url>>> =
    LazyLock::new(|| Arc::new(DashMap::new()));

/// Resolves an OpenID identifier to the provider endpoint URL.
///
/// Results are cached for the life of the process and never invalidated;
/// the set of identifiers a deployment uses is small and fixed.
#[derive(Clone)]
pub struct YadisDiscovery {
    http_client: HttpClient,
    cache: Arc<DashMap<String, Url>>,
}

impl YadisDiscovery {
    /// Discovery backed by the process-wide endpoint cache.
    pub fn new(http_client: HttpClient) -> Self {
        Self::with_cache(http_client, Arc::clone(&ENDPOINT_CACHE))
    }

    pub fn with_cache(http_client: HttpClient, cache: Arc<DashMap<String, Url>>) -> Self {
        Self { http_client, cache }
    }

    /// Discover the OpenID endpoint for `identifier`.
    pub async fn discover(&self, identifier: &str) -> Result<Url, Error> {
        if let Some(endpoint) = self.cache.get(identifier) {
            debug!("Using cached OpenID endpoint for {}", identifier);
            return Ok(endpoint.clone());
        }

        let identifier_url = Url::parse(identifier)
            .map_err(|e| discovery_error_from(DiscoveryErrorKind::InvalidIdentifier, e))?;
        let endpoint = self.fetch_endpoint(identifier_url).await?;

        debug!("Discovered OpenID endpoint {} for {}", endpoint, identifier);
        self.cache.insert(identifier.to_string(), endpoint.clone());
        Ok(endpoint)
    }

    async fn fetch_endpoint(&self, identifier_url: Url) -> Result<Url, Error> {
        let response = self
            .http_client
            .get(identifier_url.as_str())
            .header(ACCEPT, XRDS_CONTENT_TYPE)
            .send()
            .await?;

        // The identifier page may only point at the XRDS document.
        let location = response
            .headers()
            .get(XRDS_LOCATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| response.url().join(value.trim()))
            .transpose()?;

        let document = match location {
            Some(xrds_url) => {
                debug!("Following X-XRDS-Location to {}", xrds_url);
                let response = self
                    .http_client
                    .get(xrds_url.as_str())
                    .header(ACCEPT, XRDS_CONTENT_TYPE)
                    .send()
                    .await?;
                read_success_body(response, "XRDS document").await?
            }
            None => read_success_body(response, "YADIS discovery").await?,
        };

        let uri = first_service_uri(&document)?.ok_or_else(|| {
            discovery_error(
                DiscoveryErrorKind::NoEndpoint,
                "XRDS document declares no service URI",
            )
        })?;

        Url::parse(&uri).map_err(|e| discovery_error_from(DiscoveryErrorKind::InvalidDocument, e))
    }
}

/// Text of the first `<URI>` element in the XRD namespace.
pub fn first_service_uri(xml: &str) -> Result<Option<String>, Error> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_uri = false;
    loop {
        let event = reader
            .read_resolved_event()
            .map_err(|e| discovery_error_from(DiscoveryErrorKind::InvalidDocument, e))?;
        match event {
            (ResolveResult::Bound(Namespace(ns)), Event::Start(start))
                if ns == XRD_NAMESPACE.as_bytes() && start.local_name().as_ref() == b"URI" =>
            {
                in_uri = true;
            }
            (_, Event::Text(text)) if in_uri => {
                let uri = text
                    .unescape()
                    .map_err(|e| discovery_error_from(DiscoveryErrorKind::InvalidDocument, e))?;
                let uri = uri.trim();
                if !uri.is_empty() {
                    return Ok(Some(uri.to_string()));
                }
            }
            (_, Event::End(_)) => in_uri = false,
            (_, Event::Eof) => return Ok(None),
            _ => {}
        }
    }
}
