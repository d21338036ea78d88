//! The wire transport: a single request/response exchange over UDP or
//! TCP, with the per-call query budget enforced here.

use crate::{ResolveError, Result};
use async_trait::async_trait;
use bytes::BytesMut;
use rootward_dnssec::KeyFetcher;
use rootward_proto::{Message, Name, Question, RecordType, DNS_PORT, UDP_PAYLOAD_SIZE};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;
use tracing::{debug, trace};

/// Default per-call query budget. Bounds worst-case recursion through
/// nameserver-address resolution.
pub const DEFAULT_QUERY_LIMIT: u32 = 20;

/// Default per-attempt exchange timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Which wire transport to use for an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    /// Datagram exchange; responses beyond 1500 octets arrive truncated.
    Udp,
    /// Stream exchange with the two-octet big-endian length prefix.
    Tcp,
}

/// A single DNS exchange against one server.
///
/// Implementations build the request from the question, perform one
/// send/receive, and return the parsed response. Truncated (TC=1)
/// responses are returned as-is; there is no automatic TCP retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `question` to `server` and awaits the response.
    async fn exchange(
        &self,
        network: Network,
        server: SocketAddr,
        question: Question,
        recursion_desired: bool,
        edns: bool,
        dnssec: bool,
    ) -> Result<Message>;
}

/// The standard socket-backed client.
///
/// Each instance carries a request counter; one instance serves one
/// resolution, so the counter is the per-call budget.
#[derive(Debug)]
pub struct DnsClient {
    limit: u32,
    sent: AtomicU32,
    timeout: Duration,
}

impl DnsClient {
    /// Creates a client with the default budget and timeout.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_QUERY_LIMIT)
    }

    /// Creates a client with a specific query budget; zero disables the
    /// budget.
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit,
            sent: AtomicU32::new(0),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Queries sent so far.
    pub fn sent(&self) -> u32 {
        self.sent.load(Ordering::Relaxed)
    }

    fn charge(&self) -> Result<()> {
        let sent = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        if self.limit >= 1 && sent > self.limit {
            debug!(limit = self.limit, "query budget exhausted");
            return Err(ResolveError::BudgetExceeded);
        }
        Ok(())
    }

    async fn exchange_udp(&self, server: SocketAddr, wire: &[u8]) -> Result<Vec<u8>> {
        let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
        socket.connect(server).await?;
        socket.send(wire).await?;

        let mut buf = vec![0u8; usize::from(UDP_PAYLOAD_SIZE)];
        let len = socket.recv(&mut buf).await?;
        buf.truncate(len);
        Ok(buf)
    }

    async fn exchange_tcp(&self, server: SocketAddr, wire: &[u8]) -> Result<Vec<u8>> {
        let mut stream = TcpStream::connect(server).await?;

        let mut framed = BytesMut::with_capacity(wire.len() + 2);
        framed.extend_from_slice(&(wire.len() as u16).to_be_bytes());
        framed.extend_from_slice(wire);
        stream.write_all(&framed).await?;

        let mut len_prefix = [0u8; 2];
        stream.read_exact(&mut len_prefix).await?;
        let mut buf = vec![0u8; usize::from(u16::from_be_bytes(len_prefix))];
        stream.read_exact(&mut buf).await?;
        Ok(buf)
    }
}

impl Default for DnsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for DnsClient {
    async fn exchange(
        &self,
        network: Network,
        server: SocketAddr,
        question: Question,
        recursion_desired: bool,
        edns: bool,
        dnssec: bool,
    ) -> Result<Message> {
        self.charge()?;

        let request = Message::request(question, recursion_desired, edns, dnssec);
        let wire = request.to_bytes()?;
        trace!(%server, ?network, id = request.header.id, "sending query");

        let exchange = async {
            match network {
                Network::Udp => self.exchange_udp(server, &wire).await,
                Network::Tcp => self.exchange_tcp(server, &wire).await,
            }
        };
        let raw = timeout(self.timeout, exchange)
            .await
            .map_err(|_| ResolveError::Timeout)??;

        let response = Message::parse(&raw)?;
        if response.header.id != request.header.id {
            return Err(ResolveError::Transport(io::Error::new(
                io::ErrorKind::InvalidData,
                "response ID mismatch",
            )));
        }
        Ok(response)
    }
}

impl KeyFetcher for DnsClient {
    /// DNSKEY queries go out with EDNS and the DO bit so the covering
    /// RRSIG comes back; they draw from the same per-call budget.
    async fn fetch_dnskey(&self, zone: &Name, server: IpAddr) -> Option<Message> {
        let question = Question::in_class(zone.clone(), RecordType::DNSKEY);
        self.exchange(
            Network::Udp,
            SocketAddr::new(server, DNS_PORT),
            question,
            false,
            true,
            true,
        )
        .await
        .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_trips_after_limit() {
        let client = DnsClient::with_limit(2);
        assert!(client.charge().is_ok());
        assert!(client.charge().is_ok());
        assert!(matches!(
            client.charge(),
            Err(ResolveError::BudgetExceeded)
        ));
    }

    #[test]
    fn zero_limit_disables_budget() {
        let client = DnsClient::with_limit(0);
        for _ in 0..100 {
            assert!(client.charge().is_ok());
        }
    }

    #[tokio::test]
    async fn udp_exchange_against_local_responder() {
        use rootward_proto::{Name, RData, RecordClass, ResourceRecord};
        use std::str::FromStr;

        // One-shot mock server on loopback.
        let server_socket = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let server_addr = server_socket.local_addr().unwrap();

        tokio::spawn(async move {
            let mut buf = [0u8; 1500];
            let (len, peer) = server_socket.recv_from(&mut buf).await.unwrap();
            let request = Message::parse(&buf[..len]).unwrap();

            let answer = ResourceRecord::new(
                Name::from_str("example.com.").unwrap(),
                RecordClass::IN,
                300,
                RData::A("192.0.2.1".parse().unwrap()),
            );
            let response = Message::response(&request, vec![answer], Vec::new(), Vec::new());
            server_socket
                .send_to(&response.to_bytes().unwrap(), peer)
                .await
                .unwrap();
        });

        let client = DnsClient::new();
        let question = Question::a(Name::from_str("example.com.").unwrap());
        let response = client
            .exchange(Network::Udp, server_addr, question, false, false, false)
            .await
            .unwrap();

        assert_eq!(response.answers.len(), 1);
        assert_eq!(
            response.answers[0].rdata,
            RData::A("192.0.2.1".parse().unwrap())
        );
        assert_eq!(client.sent(), 1);
    }

    #[tokio::test]
    async fn tcp_exchange_uses_length_prefix() {
        use rootward_proto::{Name, RData, RecordClass, ResourceRecord};
        use std::str::FromStr;
        use tokio::net::TcpListener;

        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let server_addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut len_prefix = [0u8; 2];
            stream.read_exact(&mut len_prefix).await.unwrap();
            let mut buf = vec![0u8; usize::from(u16::from_be_bytes(len_prefix))];
            stream.read_exact(&mut buf).await.unwrap();
            let request = Message::parse(&buf).unwrap();

            let answer = ResourceRecord::new(
                Name::from_str("example.com.").unwrap(),
                RecordClass::IN,
                300,
                RData::AAAA("2001:db8::1".parse().unwrap()),
            );
            let response = Message::response(&request, vec![answer], Vec::new(), Vec::new())
                .to_bytes()
                .unwrap();
            let mut framed = (response.len() as u16).to_be_bytes().to_vec();
            framed.extend_from_slice(&response);
            stream.write_all(&framed).await.unwrap();
        });

        let client = DnsClient::new();
        let question = Question::in_class(
            Name::from_str("example.com.").unwrap(),
            RecordType::AAAA,
        );
        let response = client
            .exchange(Network::Tcp, server_addr, question, false, false, false)
            .await
            .unwrap();
        assert_eq!(response.answers.len(), 1);
    }
}
