use wirepb::wire::tag_size;
use wirepb::{
    decode_from_slice, decode_into, encode_into_vec, encode_to_slice, encode_to_vec,
    ChunkedReader, DecodeOptions, Error, IoReader, MessageBuilder, MessageParser, MessageRead,
    MessageWrite, Result, MAX_VARINT_LEN,
};

const HELLO_WIRE: [u8; 26] = [
    0x0a, 0x0b, b'H', b'e', b'l', b'l', b'o', b' ', b'w', b'o', b'r', b'l', b'd', 0x12, 0x06,
    0x08, 0xb9, 0x60, 0x10, 0x85, 0x35, 0x1d, 0x00, 0x00, 0x80, 0x3f,
];

/// `message a { repeated int32 field1 = 1; int32 field2 = 2; }`
#[derive(Debug, Default, Clone, PartialEq)]
struct MessageA {
    field1: Vec<i32>,
    field2: i32,
}

impl MessageWrite for MessageA {
    fn estimate_size(&self) -> Option<usize> {
        let per_varint = MAX_VARINT_LEN + tag_size(1);
        Some(self.field1.len() * per_varint + MAX_VARINT_LEN + tag_size(2))
    }

    fn encode(&self, b: &mut MessageBuilder<'_>) -> Result<()> {
        for value in &self.field1 {
            b.int32_field(1, *value)?;
        }
        b.int32_field(2, self.field2)
    }
}

impl MessageRead for MessageA {
    fn decode(&mut self, p: &mut MessageParser<'_>) -> Result<()> {
        while p.next_field()? {
            match p.field_id() {
                1 => p.repeated_int32_field(&mut self.field1)?,
                2 => self.field2 = p.int32_field()?,
                _ => p.skip_field()?,
            }
        }
        Ok(())
    }
}

/// `message b { string field1 = 1; a field2 = 2; float field3 = 3; }`
#[derive(Debug, Default, Clone, PartialEq)]
struct MessageB {
    field1: String,
    field2: Option<Box<MessageA>>,
    field3: f32,
}

impl MessageWrite for MessageB {
    fn encode(&self, b: &mut MessageBuilder<'_>) -> Result<()> {
        b.string_field(1, &self.field1)?;
        if let Some(a) = &self.field2 {
            b.message_field(2, a)?;
        }
        b.float_field(3, self.field3)
    }
}

impl MessageRead for MessageB {
    fn decode(&mut self, p: &mut MessageParser<'_>) -> Result<()> {
        while p.next_field()? {
            match p.field_id() {
                1 => self.field1 = p.string_field()?,
                2 => p.message_field(self.field2.get_or_insert_with(Default::default))?,
                3 => self.field3 = p.float_field()?,
                _ => p.skip_field()?,
            }
        }
        Ok(())
    }
}

fn hello() -> MessageB {
    MessageB {
        field1: "Hello world".to_string(),
        field2: Some(Box::new(MessageA {
            field1: vec![12345],
            field2: 6789,
        })),
        field3: 1.0,
    }
}

#[test]
fn hello_world_encodes_to_reference_bytes() {
    assert_eq!(encode_to_vec(&hello()).unwrap(), HELLO_WIRE);

    let mut buf = [0u8; 64];
    let n = encode_to_slice(&hello(), &mut buf).unwrap();
    assert_eq!(&buf[..n], HELLO_WIRE);
}

#[test]
fn hello_world_decodes_from_reference_bytes() {
    let msg: MessageB = decode_from_slice(&HELLO_WIRE).unwrap();
    assert_eq!(msg, hello());
}

#[test]
fn hello_world_decodes_without_peek() {
    let mut stream = IoReader::new(&HELLO_WIRE[..], HELLO_WIRE.len());
    let mut msg = MessageB::default();
    msg.decode(&mut MessageParser::new(&mut stream)).unwrap();
    assert_eq!(msg, hello());
}

#[test]
fn hello_world_decodes_from_single_byte_chunks() {
    let mut stream = ChunkedReader::new();
    for byte in HELLO_WIRE {
        stream.push(vec![byte]);
    }
    let mut msg = MessageB::default();
    msg.decode(&mut MessageParser::new(&mut stream)).unwrap();
    assert_eq!(msg, hello());
}

#[test]
fn encode_to_slice_reports_out_of_space() {
    let mut buf = [0u8; 20];
    assert_eq!(encode_to_slice(&hello(), &mut buf), Err(Error::OutOfSpace));
}

#[test]
fn input_cut_inside_a_record_fails() {
    // 13 and 21 fall between records and decode as shorter messages.
    for cut in (1..HELLO_WIRE.len()).filter(|cut| ![13, 21].contains(cut)) {
        let res = decode_from_slice::<MessageB>(&HELLO_WIRE[..cut]);
        assert!(res.is_err(), "cut at {cut} decoded");
    }
}

/// Nested message whose size is unknown up front.
struct Unsized(MessageA);

impl MessageWrite for Unsized {
    fn encode(&self, b: &mut MessageBuilder<'_>) -> Result<()> {
        self.0.encode(b)
    }
}

#[derive(Default)]
struct Holder {
    inner: MessageA,
    trailer: u64,
}

impl MessageRead for Holder {
    fn decode(&mut self, p: &mut MessageParser<'_>) -> Result<()> {
        while p.next_field()? {
            match p.field_id() {
                1 => p.message_field(&mut self.inner)?,
                2 => self.trailer = p.uint64_field()?,
                _ => p.skip_field()?,
            }
        }
        Ok(())
    }
}

#[test]
fn unknown_size_nested_message_is_padded_and_round_trips() {
    let inner = MessageA {
        field1: vec![1, -1, i32::MAX],
        field2: i32::MIN,
    };
    let body = encode_to_vec(&inner).unwrap();

    let mut buf = Vec::new();
    let mut stream = wirepb::VecWriter::new(&mut buf);
    let mut b = MessageBuilder::new(&mut stream);
    b.message_field(1, &Unsized(inner.clone())).unwrap();
    b.uint64_field(2, u64::MAX).unwrap();

    assert_eq!(buf.len(), 1 + MAX_VARINT_LEN + body.len() + 1 + MAX_VARINT_LEN);
    // Every prefix byte but the last carries a continuation bit.
    assert!(buf[1..MAX_VARINT_LEN].iter().all(|b| b & 0x80 != 0));
    assert_eq!(buf[MAX_VARINT_LEN], 0x00);
    assert_eq!(&buf[1 + MAX_VARINT_LEN..1 + MAX_VARINT_LEN + body.len()], body);

    let mut holder = Holder::default();
    decode_into(&buf, &mut holder).unwrap();
    assert_eq!(holder.inner, inner);
    assert_eq!(holder.trailer, u64::MAX);
}

struct Liar {
    promised: usize,
}

impl MessageWrite for Liar {
    fn estimate_size(&self) -> Option<usize> {
        Some(self.promised)
    }

    fn encode(&self, b: &mut MessageBuilder<'_>) -> Result<()> {
        b.string_field(1, "more than promised")
    }
}

struct Outer<M>(M);

impl<M: MessageWrite> MessageWrite for Outer<M> {
    fn encode(&self, b: &mut MessageBuilder<'_>) -> Result<()> {
        b.message_field(1, &self.0)?;
        b.bool_field(2, true)
    }
}

#[test]
fn estimate_overrun_fails_general_error() {
    assert_eq!(encode_to_vec(&Outer(Liar { promised: 3 })), Err(Error::General));

    let mut buf = vec![0xee];
    assert_eq!(
        encode_into_vec(&Outer(Liar { promised: 3 }), &mut buf),
        Err(Error::General)
    );
    assert_eq!(buf, [0xee]);
}

#[test]
fn estimate_overrun_within_placeholder_width_still_fails() {
    // 100 fits a one-byte prefix just like the real 20 bytes, but a bound of
    // 5 must still be rejected.
    assert!(encode_to_vec(&Outer(Liar { promised: 100 })).is_ok());
    assert_eq!(encode_to_vec(&Outer(Liar { promised: 5 })), Err(Error::General));
}

#[test]
fn unknown_fields_are_skipped_anywhere() {
    let unknowns: [&[u8]; 4] = [
        &[0x78, 0x96, 0x01],                   // 15: varint
        &[0x79, 1, 2, 3, 4, 5, 6, 7, 8],       // 15: fixed64
        &[0x7a, 0x03, 0x0a, 0x01, 0x00],       // 15: blob
        &[0xfd, 0x07, 0x01, 0x02, 0x03, 0x04], // 127: fixed32
    ];
    let known: [&[u8]; 3] = [&[0x08, 0x01], &[0x08, 0x02], &[0x10, 0x07]];
    let expected = MessageA {
        field1: vec![1, 2],
        field2: 7,
    };

    for unknown in unknowns {
        for at in 0..=known.len() {
            let mut data = Vec::new();
            for (i, record) in known.iter().enumerate() {
                if i == at {
                    data.extend_from_slice(unknown);
                }
                data.extend_from_slice(record);
            }
            if at == known.len() {
                data.extend_from_slice(unknown);
            }
            let msg: MessageA = decode_from_slice(&data).unwrap();
            assert_eq!(msg, expected, "unknown {unknown:02x?} at {at}");
        }
    }
}

/// Reads only the first record of its body and stops.
#[derive(Default)]
struct FirstOnly {
    first: u32,
}

impl MessageRead for FirstOnly {
    fn decode(&mut self, p: &mut MessageParser<'_>) -> Result<()> {
        if p.next_field()? {
            self.first = p.uint32_field()?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Siblings {
    nested: Vec<FirstOnly>,
    after: i32,
}

impl MessageRead for Siblings {
    fn decode(&mut self, p: &mut MessageParser<'_>) -> Result<()> {
        while p.next_field()? {
            match p.field_id() {
                1 => p.repeated_message_field(&mut self.nested)?,
                2 => self.after = p.sint32_field()?,
                _ => p.skip_field()?,
            }
        }
        Ok(())
    }
}

#[test]
fn under_consumed_nested_message_realigns_parent() {
    let data = [
        0x0a, 0x06, 0x08, 0x05, 0x10, 0x06, 0x18, 0x07, // nested: three fields
        0x0a, 0x02, 0x08, 0x09, // nested: one field
        0x10, 0x03, // after = -2
    ];
    let msg: Siblings = decode_from_slice(&data).unwrap();
    assert_eq!(msg.nested.len(), 2);
    assert_eq!(msg.nested[0].first, 5);
    assert_eq!(msg.nested[1].first, 9);
    assert_eq!(msg.after, -2);
}

#[test]
fn nested_length_past_end_is_invalid_input() {
    let data = [0x0a, 0x09, 0x08, 0x05];
    assert_eq!(
        decode_from_slice::<Siblings>(&data).err(),
        Some(Error::InvalidInput)
    );
}

#[derive(Debug, Default, PartialEq)]
struct Node {
    value: u32,
    child: Option<Box<Node>>,
}

impl MessageWrite for Node {
    fn encode(&self, b: &mut MessageBuilder<'_>) -> Result<()> {
        b.uint32_field(1, self.value)?;
        if let Some(child) = &self.child {
            b.message_field(2, child)?;
        }
        Ok(())
    }
}

impl MessageRead for Node {
    fn decode(&mut self, p: &mut MessageParser<'_>) -> Result<()> {
        while p.next_field()? {
            match p.field_id() {
                1 => self.value = p.uint32_field()?,
                2 => p.message_field(self.child.get_or_insert_with(Default::default))?,
                _ => p.skip_field()?,
            }
        }
        Ok(())
    }
}

fn chain(depth: u32) -> Node {
    let mut node = Node::default();
    for value in 1..=depth {
        node = Node {
            value,
            child: Some(Box::new(node)),
        };
    }
    node
}

#[test]
fn recursive_messages_round_trip() {
    let node = chain(20);
    let bytes = encode_to_vec(&node).unwrap();
    assert_eq!(decode_from_slice::<Node>(&bytes).unwrap(), node);
}

#[test]
fn nesting_beyond_depth_limit_is_rejected() {
    let bytes = encode_to_vec(&chain(10)).unwrap();
    let options = DecodeOptions::default().with_max_depth(5);

    let mut stream = wirepb::SliceReader::new(&bytes);
    let mut node = Node::default();
    let res = node.decode(&mut MessageParser::with_options(&mut stream, options));
    assert_eq!(res, Err(Error::InvalidInput));

    let mut stream = wirepb::SliceReader::new(&bytes);
    let options = DecodeOptions::default().with_max_depth(10);
    let mut node = Node::default();
    node.decode(&mut MessageParser::with_options(&mut stream, options))
        .unwrap();
    assert_eq!(node, chain(10));
}

#[derive(Debug, Default, PartialEq)]
struct Scalars {
    doubles: Vec<f64>,
    sints: Vec<i64>,
    fixeds: Vec<u32>,
    flags: Vec<bool>,
    ints: Vec<i32>,
}

struct PackedScalars<'a>(&'a Scalars);
struct UnpackedScalars<'a>(&'a Scalars);

impl MessageWrite for PackedScalars<'_> {
    fn encode(&self, b: &mut MessageBuilder<'_>) -> Result<()> {
        let s = self.0;
        b.packed_fixed64_field(1, &s.doubles)?;
        b.packed_varint_signed_field(2, &s.sints)?;
        b.packed_fixed32_field(3, &s.fixeds)?;
        b.packed_varint_field(4, &s.flags)?;
        b.packed_varint_field(5, &s.ints)
    }
}

impl MessageWrite for UnpackedScalars<'_> {
    fn encode(&self, b: &mut MessageBuilder<'_>) -> Result<()> {
        let s = self.0;
        for v in &s.doubles {
            b.double_field(1, *v)?;
        }
        for v in &s.sints {
            b.sint64_field(2, *v)?;
        }
        for v in &s.fixeds {
            b.fixed32_field(3, *v)?;
        }
        for v in &s.flags {
            b.bool_field(4, *v)?;
        }
        for v in &s.ints {
            b.int32_field(5, *v)?;
        }
        Ok(())
    }
}

impl MessageRead for Scalars {
    fn decode(&mut self, p: &mut MessageParser<'_>) -> Result<()> {
        while p.next_field()? {
            match p.field_id() {
                1 => p.repeated_double_field(&mut self.doubles)?,
                2 => p.repeated_sint64_field(&mut self.sints)?,
                3 => p.repeated_fixed32_field(&mut self.fixeds)?,
                4 => p.repeated_bool_field(&mut self.flags)?,
                5 => p.repeated_int32_field(&mut self.ints)?,
                _ => p.skip_field()?,
            }
        }
        Ok(())
    }
}

#[test]
fn packed_and_unpacked_decode_identically() {
    let scalars = Scalars {
        doubles: vec![0.0, -1.5, f64::INFINITY, f64::MIN_POSITIVE],
        sints: vec![0, -1, i64::MIN, i64::MAX, 300],
        fixeds: vec![0, u32::MAX, 7],
        flags: vec![true, false, true],
        ints: vec![-1, i32::MIN, i32::MAX, 0],
    };
    let packed = encode_to_vec(&PackedScalars(&scalars)).unwrap();
    let unpacked = encode_to_vec(&UnpackedScalars(&scalars)).unwrap();
    assert!(packed.len() < unpacked.len());

    assert_eq!(decode_from_slice::<Scalars>(&packed).unwrap(), scalars);
    assert_eq!(decode_from_slice::<Scalars>(&unpacked).unwrap(), scalars);

    let mut mixed = packed.clone();
    mixed.extend_from_slice(&unpacked);
    let doubled: Scalars = decode_from_slice(&mixed).unwrap();
    assert_eq!(doubled.sints.len(), 2 * scalars.sints.len());
    assert_eq!(doubled.sints[..5], scalars.sints[..]);
    assert_eq!(doubled.sints[5..], scalars.sints[..]);
}

#[test]
fn packed_floats_decode_as_fixed32_run() {
    // field 1, packed run of two floats
    let data = [0x0a, 0x08, 0x00, 0x00, 0x80, 0x3f, 0x00, 0x00, 0x00, 0xc0];
    let mut stream = wirepb::SliceReader::new(&data);
    let mut p = MessageParser::new(&mut stream);
    assert!(p.next_field().unwrap());
    let mut floats = Vec::new();
    p.repeated_float_field(&mut floats).unwrap();
    assert_eq!(floats, [1.0, -2.0]);
}
