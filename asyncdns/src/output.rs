use crate::dns::Answer;
use asyncdns_client::dns::RecordData;
use std::fmt::Write;

/// Format the answer to a query for `name` as dig-like text, one record per line.
pub fn format_answer(buf: &mut String, name: &str, answer: &Answer) {
    let rtype = answer.query_type();
    match answer {
        Answer::A(records) => {
            for r in records {
                let _ = writeln!(buf, "{}\t\t{}\t{}\t{}", name, r.ttl(), rtype, r.address());
            }
        }
        Answer::AAAA(records) => {
            for r in records {
                let _ = writeln!(buf, "{}\t\t{}\t{}\t{}", name, r.ttl(), rtype, r.address());
            }
        }
        Answer::NS(r) => {
            for ns in r.nameservers() {
                let _ = writeln!(buf, "{}\t\t{}\t{}", name, rtype, ns);
            }
        }
        Answer::CNAME(target) => {
            let _ = writeln!(buf, "{}\t\t{}\t{}", name, rtype, target);
        }
        Answer::SOA(r) => {
            let _ = writeln!(
                buf,
                "{}\t\t{}\t{} {} {} {} {} {} {}",
                name,
                rtype,
                r.mname().unwrap_or("."),
                r.rname().unwrap_or("."),
                r.serial(),
                r.refresh(),
                r.retry(),
                r.expire(),
                r.ttl()
            );
        }
        Answer::PTR(r) => {
            for n in r.names() {
                let _ = writeln!(buf, "{}\t\t{}\t{}", name, rtype, n);
            }
        }
        Answer::MX(records) => {
            for r in records {
                let _ = writeln!(buf, "{}\t\t{}\t{} {}", name, rtype, r.priority(), r.host());
            }
        }
        Answer::TXT(records) => {
            for r in records {
                let quoted: Vec<String> = r.strings().iter().map(|s| format!("{:?}", s)).collect();
                let _ = writeln!(buf, "{}\t\t{}\t{}", name, rtype, quoted.join(" "));
            }
        }
        Answer::SRV(records) => {
            for r in records {
                let _ = writeln!(
                    buf,
                    "{}\t\t{}\t{} {} {} {}",
                    name,
                    rtype,
                    r.priority(),
                    r.weight(),
                    r.port(),
                    r.host()
                );
            }
        }
        Answer::NAPTR(records) => {
            for r in records {
                let _ = writeln!(
                    buf,
                    "{}\t\t{}\t{} {} {:?} {:?} {:?} {}",
                    name,
                    rtype,
                    r.order(),
                    r.preference(),
                    r.flags().unwrap_or(""),
                    r.service().unwrap_or(""),
                    r.regexp().unwrap_or(""),
                    r.replacement()
                );
            }
        }
    }
}

/// Format decoded rdata using the description of its record type.
pub fn format_record_data(buf: &mut String, rd: &RecordData) {
    let _ = writeln!(buf, "{}\t{}", rd.query_type(), rd);
}
