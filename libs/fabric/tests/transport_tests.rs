use fanout_core::metadata::AUTHORITY;
use fanout_core::{Code, Metadata, Status};
use fanout_fabric::{
    channel::Channel,
    codec::{BincodeCodec, Codec},
    error::Error,
    frame::{CallFrame, Reply},
    request::{call_tcp, call_unix},
    server::{serve, serve_connection, Handler},
    transport::{
        FramedTransport, TcpTransport, TcpTransportListener, Transport, TransportListener,
        UnixTransport, UnixTransportListener,
    },
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct TestMessage {
    id: u32,
    data: String,
}

/// Replies with the call's authority followed by its payload
struct EchoAuthority;

#[async_trait::async_trait]
impl Handler for EchoAuthority {
    async fn handle(&self, call: CallFrame) -> Reply {
        if call.method != "/test.Echo/Echo" {
            return Reply::error(Status::unimplemented(call.method));
        }
        let mut payload = call.metadata.get(AUTHORITY).unwrap_or("").as_bytes().to_vec();
        payload.push(b'|');
        payload.extend(call.payload);
        Reply::ok(payload)
    }
}

/// Helper to get a free port
async fn get_listener() -> (TcpTransportListener, std::net::SocketAddr) {
    let listener = TcpTransportListener::bind("127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

#[tokio::test]
async fn tcp_send_receive_single_message() {
    let (listener, addr) = get_listener().await;

    tokio::spawn(async move {
        let (mut transport, _addr) = listener.accept().await.unwrap();
        let received = transport.receive().await.unwrap();
        transport.send(&received).await.unwrap();
    });

    let mut client = TcpTransport::connect(addr).await.unwrap();
    let msg = b"hello world";
    client.send(msg).await.unwrap();
    let response = client.receive().await.unwrap();

    assert_eq!(response, msg);
}

#[tokio::test]
async fn tcp_multiple_messages_preserve_boundaries() {
    let (listener, addr) = get_listener().await;

    tokio::spawn(async move {
        let (mut transport, _addr) = listener.accept().await.unwrap();
        for _ in 0..3 {
            let msg = transport.receive().await.unwrap();
            transport.send(&msg).await.unwrap();
        }
    });

    let mut client = TcpTransport::connect(addr).await.unwrap();
    let messages = vec![b"first".to_vec(), b"second".to_vec(), b"third".to_vec()];

    for msg in &messages {
        client.send(msg).await.unwrap();
        let response = client.receive().await.unwrap();
        assert_eq!(&response, msg);
    }
}

#[tokio::test]
async fn tcp_receive_timeout_fires() {
    let (listener, addr) = get_listener().await;

    // Server holds the connection open and never answers
    tokio::spawn(async move {
        let (_transport, _addr) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let mut client = TcpTransport::builder()
        .host(addr.ip().to_string())
        .port(addr.port())
        .receive_timeout(Some(Duration::from_millis(100)))
        .connect()
        .await
        .unwrap();

    client.send(b"hello").await.unwrap();

    match client.receive().await {
        Err(Error::Timeout(op)) => assert_eq!(op, "Receive"),
        other => panic!("Expected timeout error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn tcp_connect_refused_is_io_error() {
    // Bind then drop to get a port nobody listens on
    let (listener, addr) = get_listener().await;
    drop(listener);

    let result = TcpTransport::builder()
        .host(addr.ip().to_string())
        .port(addr.port())
        .connect_timeout(Some(Duration::from_secs(2)))
        .connect()
        .await;

    assert!(matches!(result, Err(Error::Io(_))));
}

#[tokio::test]
async fn tcp_rejects_oversized_frame() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    // Server sends a frame header claiming 200MB
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream.write_u32(200 * 1024 * 1024).await.unwrap();
        stream.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
    });

    let mut client = TcpTransport::connect(addr).await.unwrap();

    match client.receive().await {
        Err(Error::InvalidFrame(msg)) => assert!(msg.contains("too large")),
        other => panic!("Expected InvalidFrame error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn channel_with_codec_roundtrip() {
    let (listener, addr) = get_listener().await;

    let expected_msg = TestMessage {
        id: 42,
        data: "test data".to_string(),
    };
    let expected_clone = expected_msg.clone();

    tokio::spawn(async move {
        let (transport, _addr) = listener.accept().await.unwrap();
        let mut channel = Channel::from_transport(transport, BincodeCodec);

        let msg: TestMessage = channel.receive().await.unwrap();
        channel.send(&msg).await.unwrap();
    });

    let transport = TcpTransport::connect(addr).await.unwrap();
    let mut channel = Channel::from_transport(transport, BincodeCodec);

    channel.send(&expected_msg).await.unwrap();
    let response: TestMessage = channel.receive().await.unwrap();

    assert_eq!(response, expected_clone);
}

#[tokio::test]
async fn connection_closed_error() {
    let (listener, addr) = get_listener().await;

    tokio::spawn(async move {
        let (mut transport, _addr) = listener.accept().await.unwrap();
        transport.close().await.unwrap();
    });

    let mut client = TcpTransport::connect(addr).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    match client.receive().await {
        Err(Error::ConnectionClosed) => {}
        other => panic!("Expected ConnectionClosed, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn transport_listener_trait_usage() {
    let (mut listener, addr) = get_listener().await;

    async fn accept_generic<L: TransportListener>(listener: &L) -> Result<L::Transport, Error> {
        listener.accept().await
    }

    tokio::spawn(async move {
        let mut client = TcpTransport::connect(addr).await.unwrap();
        client.send(b"test").await.unwrap();
    });

    let mut transport = accept_generic(&listener).await.unwrap();
    let msg = transport.receive().await.unwrap();
    assert_eq!(msg, b"test");

    TransportListener::close(&mut listener).await.unwrap();
}

#[tokio::test]
async fn served_call_stamps_authority() {
    let (listener, addr) = get_listener().await;
    tokio::spawn(serve(listener, EchoAuthority));

    let frame = CallFrame::new("/test.Echo/Echo", b"ping".to_vec());
    let reply = call_tcp("127.0.0.1", addr.port(), frame, BincodeCodec)
        .await
        .unwrap();

    assert_eq!(reply.into_result().unwrap(), b"127.0.0.1|ping");
}

#[tokio::test]
async fn served_call_keeps_explicit_authority() {
    let (listener, addr) = get_listener().await;
    tokio::spawn(serve(listener, EchoAuthority));

    let frame = CallFrame::new("/test.Echo/Echo", b"x".to_vec())
        .with_metadata(Metadata::new().with(AUTHORITY, ["node-1"]));
    let reply = call_tcp("127.0.0.1", addr.port(), frame, BincodeCodec)
        .await
        .unwrap();

    assert_eq!(reply.into_result().unwrap(), b"node-1|x");
}

#[tokio::test]
async fn served_connection_handles_many_calls_and_garbage() {
    let (client_side, server_side) = tokio::io::duplex(64 * 1024);
    tokio::spawn(serve_connection(FramedTransport::new(server_side), EchoAuthority));

    let mut client = FramedTransport::new(client_side);
    let codec = BincodeCodec;

    // Undecodable frame gets an Internal status and the connection survives
    client.send(b"\x01\x02").await.unwrap();
    let reply: Reply = codec.decode(&client.receive().await.unwrap()).unwrap();
    assert_eq!(reply.status.map(|s| s.code), Some(Code::Internal));

    let mut channel = Channel::from_transport(client, codec);
    let unknown = channel
        .call(&CallFrame::new("/test.Echo/Nope", Vec::new()))
        .await
        .unwrap();
    assert_eq!(unknown.status.map(|s| s.code), Some(Code::Unimplemented));

    for i in 0..3u8 {
        let reply = channel
            .call(&CallFrame::new("/test.Echo/Echo", vec![i]))
            .await
            .unwrap();
        assert_eq!(reply.into_result().unwrap(), vec![b'|', i]);
    }
}

/// Listener whose first accept fails, then hands out one in-memory connection
struct FlakyListener {
    queue: std::sync::Mutex<Vec<Result<FramedTransport<tokio::io::DuplexStream>, Error>>>,
}

#[async_trait::async_trait]
impl TransportListener for FlakyListener {
    type Transport = FramedTransport<tokio::io::DuplexStream>;

    async fn accept(&self) -> Result<Self::Transport, Error> {
        let next = self.queue.lock().unwrap().pop();
        match next {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

#[tokio::test]
async fn serve_survives_failed_accept() {
    let (client_side, server_side) = tokio::io::duplex(64 * 1024);
    let too_many_files = std::io::Error::new(std::io::ErrorKind::Other, "Too many open files");

    // Popped from the back: the error comes first
    let listener = FlakyListener {
        queue: std::sync::Mutex::new(vec![
            Ok(FramedTransport::new(server_side)),
            Err(Error::Io(too_many_files)),
        ]),
    };
    let server = tokio::spawn(serve(listener, EchoAuthority));

    let mut channel = Channel::from_transport(FramedTransport::new(client_side), BincodeCodec);
    let reply = tokio::time::timeout(
        Duration::from_secs(2),
        channel.call(&CallFrame::new("/test.Echo/Echo", b"up".to_vec())),
    )
    .await
    .expect("server stopped accepting")
    .unwrap();

    assert_eq!(reply.into_result().unwrap(), b"|up");
    assert!(!server.is_finished());
}

// Unix Socket Tests

#[tokio::test]
async fn unix_send_receive_single_message() {
    let socket_path = "/tmp/fanout_test_unix_single.sock";
    let _ = std::fs::remove_file(socket_path);

    let listener = UnixTransportListener::bind(socket_path).await.unwrap();

    tokio::spawn(async move {
        let mut transport = listener.accept().await.unwrap();
        let received = transport.receive().await.unwrap();
        transport.send(&received).await.unwrap();
    });

    let mut client = UnixTransport::connect(socket_path).await.unwrap();
    let msg = b"hello unix";
    client.send(msg).await.unwrap();
    let response = client.receive().await.unwrap();

    assert_eq!(response, msg);

    let _ = std::fs::remove_file(socket_path);
}

#[tokio::test]
async fn unix_listener_cleans_up_socket() {
    let socket_path = "/tmp/fanout_test_unix_cleanup.sock";
    let _ = std::fs::remove_file(socket_path);

    {
        let mut listener = UnixTransportListener::bind(socket_path).await.unwrap();
        assert!(std::path::Path::new(socket_path).exists());

        listener.close().await.unwrap();
    }

    assert!(!std::path::Path::new(socket_path).exists());
}

#[tokio::test]
async fn unix_timeout_works() {
    let socket_path = "/tmp/fanout_test_unix_timeout.sock";
    let _ = std::fs::remove_file(socket_path);

    let listener = UnixTransportListener::bind(socket_path).await.unwrap();

    tokio::spawn(async move {
        let _transport = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let mut client = UnixTransport::builder()
        .path(socket_path)
        .receive_timeout(Some(Duration::from_millis(100)))
        .connect()
        .await
        .unwrap();

    client.send(b"hello").await.unwrap();

    assert!(matches!(client.receive().await, Err(Error::Timeout(_))));

    let _ = std::fs::remove_file(socket_path);
}

#[tokio::test]
async fn unix_call_through_server() {
    let socket_path = "/tmp/fanout_test_unix_call.sock";
    let _ = std::fs::remove_file(socket_path);

    let listener = UnixTransportListener::bind(socket_path).await.unwrap();
    tokio::spawn(serve(listener, EchoAuthority));

    let frame = CallFrame::new("/test.Echo/Echo", b"local".to_vec())
        .with_metadata(Metadata::new().with(AUTHORITY, ["self"]));
    let reply = call_unix(socket_path, &frame, BincodeCodec).await.unwrap();

    assert_eq!(reply.into_result().unwrap(), b"self|local");
}
