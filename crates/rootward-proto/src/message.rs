//! Whole DNS messages: parse, emit with name compression, and request /
//! response construction.

use crate::class::RecordClass;
use crate::error::Result;
use crate::header::{Header, HeaderFlags, HEADER_SIZE};
use crate::name::Name;
use crate::question::Question;
use crate::rcode::ResponseCode;
use crate::rdata::RData;
use crate::record::ResourceRecord;
use crate::rtype::RecordType;
use crate::UDP_PAYLOAD_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The DO ("DNSSEC OK") flag, bit 15 of the low half of an OPT TTL.
const EDNS_DO_BIT: u32 = 1 << 15;

/// A complete DNS message.
///
/// Sections are kept in wire order; the OPT pseudo-record, when present,
/// lives in the additional section like any other record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    /// The fixed header. Counts are recomputed on emission.
    pub header: Header,
    /// Question section; a single entry in practice.
    pub questions: Vec<Question>,
    /// Answer section.
    pub answers: Vec<ResourceRecord>,
    /// Authority section.
    pub authority: Vec<ResourceRecord>,
    /// Additional section, OPT included.
    pub additional: Vec<ResourceRecord>,
}

impl Message {
    /// Builds a request for `question`.
    ///
    /// The transaction ID comes from a cryptographic RNG (a weak RNG here
    /// is a known spoofing vector). An OPT record advertising a 1500-octet
    /// payload is appended when `edns` is set, with the DO bit when
    /// `dnssec` is set; `dnssec` implies `edns`.
    pub fn request(question: Question, recursion_desired: bool, edns: bool, dnssec: bool) -> Self {
        let mut flags = HeaderFlags::empty();
        if recursion_desired {
            flags |= HeaderFlags::RD;
        }

        let mut additional = Vec::new();
        if edns || dnssec {
            additional.push(ResourceRecord {
                name: Name::root(),
                rtype: RecordType::OPT,
                rclass: RecordClass::Unknown(UDP_PAYLOAD_SIZE),
                ttl: if dnssec { EDNS_DO_BIT } else { 0 },
                rdata: RData::OPT,
            });
        }

        Self {
            header: Header {
                id: rand::random(),
                flags,
                qd_count: 1,
                ar_count: additional.len() as u16,
                ..Header::default()
            },
            questions: vec![question],
            answers: Vec::new(),
            authority: Vec::new(),
            additional,
        }
    }

    /// Builds a response to `request` carrying the given sections.
    pub fn response(
        request: &Message,
        answers: Vec<ResourceRecord>,
        authority: Vec<ResourceRecord>,
        additional: Vec<ResourceRecord>,
    ) -> Self {
        Self {
            header: Header {
                id: request.header.id,
                flags: HeaderFlags::QR,
                opcode: request.header.opcode,
                rcode: ResponseCode::NoError,
                qd_count: request.questions.len() as u16,
                an_count: answers.len() as u16,
                ns_count: authority.len() as u16,
                ar_count: additional.len() as u16,
            },
            questions: request.questions.clone(),
            answers,
            authority,
            additional,
        }
    }

    /// Builds an empty response to `request` with the given failure code
    /// and the AD bit clear.
    pub fn failure_response(request: &Message, rcode: ResponseCode) -> Self {
        let mut response = Self::response(request, Vec::new(), Vec::new(), Vec::new());
        response.header.rcode = rcode;
        response
    }

    /// The first question, if any.
    pub fn question(&self) -> Option<&Question> {
        self.questions.first()
    }

    /// Returns true for an NXDOMAIN response.
    pub fn is_nxdomain(&self) -> bool {
        self.header.rcode == ResponseCode::NXDomain
    }

    /// Returns true for a SERVFAIL response.
    pub fn is_servfail(&self) -> bool {
        self.header.rcode == ResponseCode::ServFail
    }

    /// Returns true if the DO bit is set on this message's OPT record.
    pub fn dnssec_ok(&self) -> bool {
        self.opt()
            .map(|opt| opt.ttl & EDNS_DO_BIT != 0)
            .unwrap_or(false)
    }

    /// EDNS payload size advertised by the OPT record, if present.
    pub fn edns_payload_size(&self) -> Option<u16> {
        self.opt().map(|opt| opt.rclass.to_u16())
    }

    fn opt(&self) -> Option<&ResourceRecord> {
        self.additional.iter().find(|r| r.rtype == RecordType::OPT)
    }

    /// Parses a message from wire format.
    pub fn parse(msg: &[u8]) -> Result<Self> {
        let header = Header::parse(msg)?;

        let mut offset = HEADER_SIZE;
        let mut questions = Vec::with_capacity(usize::from(header.qd_count));
        for _ in 0..header.qd_count {
            let (question, next) = Question::parse(msg, offset)?;
            questions.push(question);
            offset = next;
        }

        let mut records = Vec::with_capacity(header.record_count());
        for _ in 0..header.record_count() {
            let (record, next) = ResourceRecord::parse(msg, offset)?;
            records.push(record);
            offset = next;
        }

        let an = usize::from(header.an_count);
        let ns = usize::from(header.ns_count);
        let additional = records.split_off(an + ns);
        let authority = records.split_off(an);

        Ok(Self {
            header,
            questions,
            answers: records,
            authority,
            additional,
        })
    }

    /// Emits the message, compressing names against the growing buffer.
    ///
    /// Question names are written literally; record owner names and
    /// compressible RDATA names collapse onto earlier occurrences.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut header = self.header.clone();
        header.qd_count = self.questions.len() as u16;
        header.an_count = self.answers.len() as u16;
        header.ns_count = self.authority.len() as u16;
        header.ar_count = self.additional.len() as u16;

        let mut msg = Vec::with_capacity(512);
        msg.extend_from_slice(&header.to_bytes());

        for question in &self.questions {
            msg.extend_from_slice(&question.to_bytes());
        }
        for record in self
            .answers
            .iter()
            .chain(&self.authority)
            .chain(&self.additional)
        {
            let bytes = record.to_bytes(&msg)?;
            msg.extend_from_slice(&bytes);
        }
        Ok(msg)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;

        writeln!(f, ";; QUESTION SECTION:")?;
        for question in &self.questions {
            writeln!(f, ";{question}")?;
        }

        for (title, section) in [
            ("ANSWER", &self.answers),
            ("AUTHORITY", &self.authority),
            ("ADDITIONAL", &self.additional),
        ] {
            if !section.is_empty() {
                writeln!(f, "\n;; {title} SECTION:")?;
                for record in section.iter() {
                    writeln!(f, "{record}")?;
                }
            }
        }
        Ok(())
    }
}
