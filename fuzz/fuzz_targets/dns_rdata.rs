#![no_main]

use asyncdns_client::dns::{QueryType, RecordData};
use libfuzzer_sys::{Corpus, arbitrary, fuzz_target};

const TYPES: [QueryType; 10] = [
    QueryType::A,
    QueryType::NS,
    QueryType::CNAME,
    QueryType::SOA,
    QueryType::PTR,
    QueryType::MX,
    QueryType::TXT,
    QueryType::AAAA,
    QueryType::SRV,
    QueryType::NAPTR,
];

#[derive(Debug, arbitrary::Arbitrary)]
struct Input<'a> {
    rtype: u8,
    ttl: Option<u32>,
    rdata: &'a [u8],
}

fuzz_target!(|input: Input<'_>| -> Corpus {
    let qtype = TYPES[usize::from(input.rtype) % TYPES.len()];
    match RecordData::read_network_bytes(qtype, input.rdata, input.ttl) {
        Ok(rd) => {
            assert_eq!(qtype, rd.query_type());
            let _ = rd.to_string();
            Corpus::Keep
        }
        Err(_) => Corpus::Reject,
    }
});
