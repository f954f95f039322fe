#![allow(clippy::unwrap_used, clippy::expect_used)]

use byteorder::{BigEndian, WriteBytesExt};
use rustyrtp::{
    Frame, HandlerKey, PktDispatcher, RceFlags, RtpError, RtpFrame, ZrtpFrame,
    dispatch::{DispatcherState, aux_fn, primary_fn},
    frame::{ZRTP_MAGIC, dealloc_frame},
    handlers::{RtpHandler, ZrtpHandler},
    log::{LogSink, NoopLogSink},
    socket::{DatagramSocket, MemSocket, UdpTransport},
};
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, mpsc},
    thread,
    time::{Duration, Instant},
};

fn logger() -> Arc<dyn LogSink> {
    Arc::new(NoopLogSink)
}

fn rtp_packet(seq: u16, payload: &[u8]) -> Vec<u8> {
    let mut p = Vec::new();
    p.write_u8(0x80).unwrap(); // V=2
    p.write_u8(96).unwrap();
    p.write_u16::<BigEndian>(seq).unwrap();
    p.write_u32::<BigEndian>(1234).unwrap();
    p.write_u32::<BigEndian>(0xDEAD_BEEF).unwrap();
    p.extend_from_slice(payload);
    p
}

fn zrtp_packet(seq: u16) -> Vec<u8> {
    let mut p = Vec::new();
    p.write_u16::<BigEndian>(0x1000).unwrap(); // version 1, reserved
    p.write_u16::<BigEndian>(seq).unwrap();
    p.write_u32::<BigEndian>(ZRTP_MAGIC).unwrap();
    p.write_u32::<BigEndian>(0x0BAD_CAFE).unwrap();
    p.extend_from_slice(b"Hello   ");
    p
}

/// Dispatcher running on one end of a memory pair; returns the other end.
fn running(d: &PktDispatcher) -> Arc<MemSocket> {
    let (a, b) = MemSocket::pair_with_timeout(Duration::from_millis(20));
    d.start(Arc::new(b), RceFlags::NONE).unwrap();
    Arc::new(a)
}

#[test]
fn test_two_primaries_run_only_their_own_auxiliaries() {
    let d = PktDispatcher::new(logger());
    let rtp_key = d.install_handler(Some(Box::new(RtpHandler)));
    let zrtp_key = d.install_handler(Some(Box::new(ZrtpHandler)));

    let calls = Arc::new(Mutex::new(Vec::new()));
    for (key, tag) in [(rtp_key, "rtp"), (zrtp_key, "zrtp")] {
        let calls = calls.clone();
        d.install_aux_handler(
            key,
            Some(aux_fn(move |_, slot| {
                let kind = slot.as_ref().map(Frame::kind).unwrap_or("none");
                calls.lock().unwrap().push((tag, kind));
                Ok(())
            })),
        )
        .unwrap();
    }

    let peer = running(&d);
    peer.send(&rtp_packet(1, b"media")).unwrap();
    peer.send(&zrtp_packet(1)).unwrap();

    let first = d.pull_frame_timeout(Duration::from_secs(2)).unwrap();
    let second = d.pull_frame_timeout(Duration::from_secs(2)).unwrap();
    d.stop().unwrap();

    assert_eq!(first.as_rtp().unwrap().payload(), b"media");
    assert_eq!(second.into_zrtp().unwrap().ssrc, 0x0BAD_CAFE);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![("rtp", "rtp"), ("zrtp", "zrtp")]
    );
}

#[test]
fn test_install_none_gives_invalid_key() {
    let d = PktDispatcher::new(logger());
    assert_eq!(d.install_handler(None), HandlerKey::INVALID);
    let key = d.install_handler(Some(Box::new(RtpHandler)));
    assert!(key.is_valid());
    assert!(matches!(
        d.install_aux_handler(HandlerKey::INVALID, Some(aux_fn(|_, _| Ok(())))),
        Err(RtpError::InvalidValue(_))
    ));
    assert!(matches!(
        d.install_aux_handler(key, None),
        Err(RtpError::InvalidValue(_))
    ));
}

#[test]
fn test_auxiliaries_run_in_installation_order_for_every_datagram() {
    let d = PktDispatcher::new(logger());
    let key = d.install_handler(Some(Box::new(RtpHandler)));
    let order = Arc::new(Mutex::new(Vec::new()));
    for tag in ['a', 'b', 'c'] {
        let order = order.clone();
        d.install_aux_handler(
            key,
            Some(aux_fn(move |_, _| {
                order.lock().unwrap().push(tag);
                Ok(())
            })),
        )
        .unwrap();
    }

    let peer = running(&d);
    for seq in 0..3 {
        peer.send(&rtp_packet(seq, b"x")).unwrap();
    }
    for _ in 0..3 {
        d.pull_frame_timeout(Duration::from_secs(2)).unwrap();
    }
    d.stop().unwrap();
    assert_eq!(order.lock().unwrap().iter().collect::<String>(), "abcabcabc");
}

#[test]
fn test_pull_timeouts() {
    let d = Arc::new(PktDispatcher::new(logger()));
    d.install_handler(Some(Box::new(RtpHandler)));
    let peer = running(&d);

    // immediate poll
    let t0 = Instant::now();
    assert!(d.pull_frame_timeout(Duration::ZERO).is_none());
    assert!(t0.elapsed() < Duration::from_millis(20));

    // frame injected at 10 ms, 50 ms budget
    let injector = {
        let peer = peer.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            peer.send(&rtp_packet(42, b"late")).unwrap();
        })
    };
    let got = d.pull_frame_timeout(Duration::from_millis(50));
    injector.join().unwrap();
    assert_eq!(got.unwrap().as_rtp().unwrap().header.sequence_number, 42);

    // nothing in 50 ms
    let t0 = Instant::now();
    assert!(d.pull_frame_timeout(Duration::from_millis(50)).is_none());
    assert!(t0.elapsed() >= Duration::from_millis(50));
    d.stop().unwrap();
}

#[test]
fn test_stop_joins_and_pull_returns_promptly() {
    let d = PktDispatcher::new(logger());
    d.install_handler(Some(Box::new(RtpHandler)));
    let peer = running(&d);
    peer.send(&rtp_packet(7, b"buffered")).unwrap();
    assert!(d.pull_frame_timeout(Duration::from_secs(2)).is_some());
    peer.send(&rtp_packet(8, b"buffered")).unwrap();
    thread::sleep(Duration::from_millis(50));

    let t0 = Instant::now();
    d.stop().unwrap();
    assert_eq!(d.state(), DispatcherState::Stopped);
    // a frame that made it in before stop is still handed out
    assert!(d.pull_frame().is_some());
    assert!(d.pull_frame().is_none());
    assert!(t0.elapsed() < Duration::from_secs(1));

    // nothing reads the socket any more
    let before = d.stats().received;
    peer.send(&rtp_packet(9, b"ignored")).unwrap();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(d.stats().received, before);
}

#[test]
fn test_hook_mode_excludes_the_queue() {
    let d = PktDispatcher::new(logger());
    d.install_handler(Some(Box::new(RtpHandler)));
    assert!(d.install_receive_hook(None).is_err());

    let (tx, rx) = mpsc::channel();
    d.install_receive_hook(Some(Box::new(move |f: Frame| {
        let _ = tx.send(f.as_rtp().map(|r| r.header.sequence_number));
    })))
    .unwrap();

    let peer = running(&d);
    for seq in 10..13 {
        peer.send(&rtp_packet(seq, b"h")).unwrap();
    }
    let got: Vec<_> = (0..3)
        .map(|_| rx.recv_timeout(Duration::from_secs(2)).unwrap().unwrap())
        .collect();
    assert_eq!(got, vec![10, 11, 12]);
    assert!(d.pull_frame_timeout(Duration::from_millis(20)).is_none());
    d.stop().unwrap();
}

#[test]
fn test_fatal_socket_error_stops_the_dispatcher() {
    let d = PktDispatcher::new(logger());
    d.install_handler(Some(Box::new(RtpHandler)));
    let (a, b) = MemSocket::pair_with_timeout(Duration::from_millis(20));
    let b = Arc::new(b);
    d.start(b.clone(), RceFlags::NONE).unwrap();
    drop(a);

    b.close();
    assert!(d.wait_for_state(DispatcherState::Stopped, Duration::from_secs(2)));
    let t0 = Instant::now();
    assert!(d.pull_frame().is_none());
    assert!(t0.elapsed() < Duration::from_millis(500));
    // the dead loop is reaped without error
    assert!(d.stop().is_ok());
}

#[test]
fn test_malformed_and_foreign_datagrams_are_counted() {
    let d = PktDispatcher::new(logger());
    d.install_handler(Some(Box::new(RtpHandler)));
    let peer = running(&d);

    let mut bad = rtp_packet(1, b"");
    bad[0] |= 0x0F; // 15 CSRCs that are not there
    peer.send(&bad).unwrap();
    peer.send(&[0x00; 20]).unwrap();
    peer.send(&rtp_packet(2, b"ok")).unwrap();

    let f = d.pull_frame_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(f.as_rtp().unwrap().header.sequence_number, 2);
    d.stop().unwrap();
    let c = d.stats();
    assert_eq!((c.received, c.parse_failures, c.dropped, c.delivered), (3, 1, 1, 1));
}

#[test]
fn test_frames_are_released_once() {
    let d = PktDispatcher::new(logger());
    d.install_handler(Some(primary_fn(|dgram, _| {
        Ok(Some(Frame::Rtp(RtpFrame::parse(dgram.clone(), false)?)))
    })));
    let peer = running(&d);
    peer.send(&rtp_packet(3, b"free me")).unwrap();
    let frame = d.pull_frame_timeout(Duration::from_secs(2)).unwrap();
    d.stop().unwrap();

    let rtp = frame.into_rtp().unwrap();
    assert!(rtp.is_alive());
    assert!(dealloc_frame(Some(rtp)).is_ok());
    assert!(matches!(dealloc_frame(None), Err(RtpError::InvalidValue(_))));
    assert!(Frame::Zrtp(ZrtpFrame::alloc(4).unwrap()).dealloc().is_ok());
}

#[test]
fn test_udp_loopback() {
    let loopback: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let rx = UdpTransport::bind(
        loopback,
        loopback,
        Some(Duration::from_millis(20)),
        logger(),
    )
    .unwrap();
    let tx = UdpTransport::bind(loopback, rx.local_addr(), None, logger()).unwrap();

    let d = PktDispatcher::new(logger());
    d.install_handler(Some(Box::new(ZrtpHandler)));
    d.install_handler(Some(Box::new(RtpHandler)));
    d.start(Arc::new(rx), RceFlags::NONE).unwrap();

    tx.send(&zrtp_packet(5)).unwrap();
    tx.send(&rtp_packet(6, b"over udp")).unwrap();
    let mut kinds = Vec::new();
    for _ in 0..2 {
        kinds.push(d.pull_frame_timeout(Duration::from_secs(2)).unwrap().kind());
    }
    kinds.sort_unstable();
    assert_eq!(kinds, vec!["rtp", "zrtp"]);

    let t0 = Instant::now();
    d.stop().unwrap();
    assert!(t0.elapsed() < Duration::from_secs(1));
}
