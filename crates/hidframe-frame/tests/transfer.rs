use bytes::Bytes;
use hidframe_frame::{
    decode_frame, frame_count, FrameConfig, FrameError, FrameReader, FrameWriter, Position,
    DEFAULT_CHUNK_CAPACITY,
};
use hidframe_transport::{open_device, DeviceFilter, DeviceInfo, MemoryBackend, MemoryDevice};

const SOLILOQUY: &[u8] = b"to be, or not to be: that is the question: whether 'tis nobler in the mind to suffer the slings and arrows of outrageous fortune, or to take arms against a sea of troubles, and by opposing end them? to die: to sleep; no more; and by a sleep to say we end the heart-ache and the thousand natural shocks that flesh is heir to, 'tis a consummation devoutly to be wish'd.";

fn comm_device(backend: &MemoryBackend) -> MemoryDevice {
    backend.attach(DeviceInfo {
        vendor_id: 0x303A,
        product_id: 0x1324,
        path: "mem:kbd".to_string(),
        interface_number: 0,
        usage_page: 0x01,
        usage: 0x06,
    });
    backend.attach(DeviceInfo {
        vendor_id: 0x303A,
        product_id: 0x1324,
        path: "mem:comm".to_string(),
        interface_number: 1,
        usage_page: 0xFFFF,
        usage: 0x01,
    })
}

#[test]
fn send_through_discovered_device() {
    let backend = MemoryBackend::new();
    let comm = comm_device(&backend);

    let session = open_device(&backend, &DeviceFilter::default()).expect("comm interface opens");
    let mut writer = FrameWriter::new(session);
    let count = writer.send(Bytes::from_static(SOLILOQUY)).expect("send succeeds");
    writer.close().expect("close succeeds");

    let expected = frame_count(SOLILOQUY.len(), DEFAULT_CHUNK_CAPACITY);
    assert_eq!(count, expected);

    let written = comm.written();
    assert_eq!(written.len(), expected);

    let mut rebuilt = Vec::new();
    for (i, report) in written.iter().enumerate() {
        let frame = decode_frame(report, 0x03).expect("report decodes");
        assert_eq!(frame.remaining as usize, expected - i - 1);
        assert_eq!(frame.position, Position::for_index(i, expected));
        rebuilt.extend_from_slice(frame.data());
    }
    assert_eq!(rebuilt, SOLILOQUY);
}

#[test]
fn loopback_roundtrip_at_boundaries() {
    let backend = MemoryBackend::new();
    let comm = comm_device(&backend);
    comm.set_loopback(true);

    let mut writer = FrameWriter::new(comm.session());
    let mut reader = FrameReader::new(comm.session());

    let c = DEFAULT_CHUNK_CAPACITY;
    for len in [0, 1, c - 1, c, c + 1, 4 * c + 17] {
        let payload: Vec<u8> = (0..len).map(|i| (i * 31 % 251) as u8).collect();
        writer.send(payload.clone()).expect("send succeeds");
        let received = reader.recv().expect("recv succeeds");
        assert_eq!(received.as_ref(), payload.as_slice(), "len {len}");
    }

    assert_eq!(comm.pending_input(), 0);
}

#[test]
fn large_transfer_with_small_reports() {
    let device = MemoryDevice::new(DeviceInfo {
        vendor_id: 0x303A,
        product_id: 0x1324,
        path: "mem:small".to_string(),
        interface_number: 1,
        usage_page: 0xFFFF,
        usage: 0x01,
    });
    device.set_loopback(true);

    let cfg = FrameConfig::for_report_size(0x03, 8).expect("8-byte reports are valid");
    assert_eq!(cfg.chunk_capacity, 3);

    let payload: Vec<u8> = SOLILOQUY.iter().copied().cycle().take(23_000).collect();
    let mut writer = FrameWriter::with_config(device.session(), cfg.clone());
    let mut reader = FrameReader::with_config(device.session(), cfg);

    let frames = writer.send(payload.clone()).expect("send succeeds");
    assert_eq!(frames, 23_000usize.div_ceil(3));
    assert!(device.written().iter().all(|r| r.len() == 9));

    assert_eq!(reader.recv().expect("recv succeeds").as_ref(), payload.as_slice());
}

#[test]
fn interleaved_transfers_of_different_length_are_detected() {
    let device = MemoryDevice::new(DeviceInfo {
        vendor_id: 0x303A,
        product_id: 0x1324,
        path: "mem:comm".to_string(),
        interface_number: 1,
        usage_page: 0xFFFF,
        usage: 0x01,
    });

    let cfg = FrameConfig {
        chunk_capacity: 2,
        report_size: None,
        ..FrameConfig::default()
    };
    let mut writer = FrameWriter::with_config(device.session(), cfg.clone());
    writer.send(Bytes::from_static(b"ABCDE")).expect("send succeeds");
    writer.send(Bytes::from_static(b"stuvwxy")).expect("send succeeds");

    // first frame of each transfer back to back: remaining 2 then 3
    let written = device.written();
    device.push_input(written[0].clone());
    device.push_input(written[3].clone());

    let mut reader = FrameReader::with_config(device.session(), cfg);
    let err = reader.recv().expect_err("interleaving must fail");
    assert!(matches!(
        err,
        FrameError::OutOfSequence {
            expected: 1,
            actual: 3
        }
    ));
}
