use asyncdns_client::dns::{
    DnsResolver, Interface, QueryConfig, QueryType, RawAnswer, ReplyCallback, ResolverService, SessionRequest,
    TXTRecord,
};
use asyncdns_client::ErrorKind;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Service that answers from a fixed zone synchronously, from within `open`,
/// before the session has even been returned to the caller.
struct ZoneService {
    zone: HashMap<(String, QueryType), Vec<Vec<u8>>>,
    released: Arc<AtomicU64>,
}

struct ZoneSession;

impl ResolverService for ZoneService {
    type Session = ZoneSession;

    fn open(&self, request: &SessionRequest, callback: ReplyCallback) -> Result<Self::Session, i32> {
        match self.zone.get(&(request.name.to_string(), request.qtype)) {
            None => callback(RawAnswer::status(-65538)),
            Some(answers) => {
                for (i, rdata) in answers.iter().enumerate() {
                    callback(RawAnswer::record(rdata, 120, i + 1 < answers.len()));
                }
            }
        }

        Ok(ZoneSession)
    }

    fn release(&self, _session: Self::Session) {
        self.released.fetch_add(1, Ordering::Release);
    }
}

fn resolver(released: Arc<AtomicU64>) -> DnsResolver<ZoneService> {
    let mut zone = HashMap::new();
    zone.insert(
        ("example.com.".to_owned(), QueryType::TXT),
        vec![
            b"\x0bhello world".to_vec(),
            b"\x04key=\x05value".to_vec(),
        ],
    );
    zone.insert(
        ("_http._tcp.example.com.".to_owned(), QueryType::SRV),
        vec![b"\x00\x01\x00\x02\x1f\x90\x03www\x07example\x03com\x00".to_vec()],
    );

    DnsResolver::new(
        ZoneService { zone, released },
        QueryConfig {
            timeout: Duration::from_secs(1),
        },
    )
}

#[tokio::test]
async fn test_external_service_txt() {
    let released = Arc::new(AtomicU64::new(0));
    let resolver = resolver(released.clone());

    let records = resolver.query_txt("example.com").await.unwrap();
    assert_eq!(
        vec![TXTRecord::new(vec!["hello world"]), TXTRecord::new(vec!["key=", "value"])],
        records
    );
    assert_eq!("key=value", records[1].txt());
    assert_eq!(1, released.load(Ordering::Acquire));
}

#[tokio::test]
async fn test_external_service_srv() {
    let released = Arc::new(AtomicU64::new(0));
    let resolver = resolver(released.clone());

    let records = resolver
        .query_srv("_http._tcp.example.com.", Interface::LocalOnly)
        .await
        .unwrap();

    assert_eq!(1, records.len());
    assert_eq!("www.example.com.", records[0].host());
    assert_eq!(8080, records[0].port());
    assert_eq!(2, records[0].weight());
    assert_eq!(1, records[0].priority());
}

#[tokio::test]
async fn test_external_service_not_found() {
    let released = Arc::new(AtomicU64::new(0));
    let resolver = resolver(released.clone());

    let err = resolver.query_soa("missing.example.com").await.unwrap_err();
    assert_eq!(ErrorKind::NotFound, err.kind());
    assert_eq!(Some(-65538), err.status());
    assert_eq!(1, released.load(Ordering::Acquire));
}
