use crate::core::ResolverError;
use crate::dns::core::QueryType;
use crate::dns::rdata::RecordData;
use crate::dns::service::RawAnswer;
use crate::dns::status::check_status;

/// Outcome of feeding a single answer to a `ReplyAccumulator`.
#[derive(Debug)]
pub enum Accumulation {
    Continue,
    Complete(Vec<RecordData>),
    Failed(ResolverError),
}

/// Collects decoded records of a single query across callback invocations and
/// decides when the query is complete.
#[derive(Debug)]
pub struct ReplyAccumulator {
    qtype: QueryType,
    records: Vec<RecordData>,
}

impl ReplyAccumulator {
    pub fn new(qtype: QueryType) -> Self {
        Self {
            qtype,
            records: Vec::new(),
        }
    }

    pub fn query_type(&self) -> QueryType {
        self.qtype
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn accept(&mut self, answer: &RawAnswer<'_>) -> Accumulation {
        if let Err(e) = check_status(answer.status) {
            self.records.clear();
            return Accumulation::Failed(e);
        }

        if let Some(rdata) = answer.rdata {
            match RecordData::read_network_bytes(self.qtype, rdata, answer.ttl) {
                Ok(rd) => self.records.push(rd),
                Err(e) => {
                    self.records.clear();
                    return Accumulation::Failed(e);
                }
            }
        }

        if answer.more_coming {
            return Accumulation::Continue;
        }

        if self.records.is_empty() && self.qtype.is_single_answer() {
            return Accumulation::Failed(ResolverError::no_data(format!(
                "no {} records in response",
                self.qtype
            )));
        }

        Accumulation::Complete(std::mem::take(&mut self.records))
    }
}
