use std::io::{self, Write};

use crate::protocol::Event;

/// Turns an event into a transmissible byte payload.
///
/// The transport treats the payload as opaque; implementations decide the
/// wire format. The [`EnvelopeSerializer`] default produces the sentry
/// envelope framing understood by the ingestion endpoint.
pub trait PayloadSerializer: Send + Sync {
    /// Serializes the event into a byte payload.
    fn serialize(&self, event: &Event) -> io::Result<Vec<u8>>;
}

/// The default [`PayloadSerializer`], writing sentry envelopes.
///
/// An Envelope is the data format that Sentry uses for Ingestion. It frames
/// each item with a JSON header carrying its type and byte length.
///
/// See the [documentation on Envelopes](https://develop.sentry.dev/sdk/envelopes/)
/// for more details.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvelopeSerializer;

impl EnvelopeSerializer {
    /// Serialize the event as an envelope into the given [`Write`].
    pub fn to_writer<W>(&self, event: &Event, mut writer: W) -> io::Result<()>
    where
        W: Write,
    {
        // write the envelope header:
        writeln!(writer, r#"{{"event_id":"{}"}}"#, event.event_id)?;

        // the item payload goes to a temporary buffer first, since the item
        // header needs its length
        let mut item_buf = Vec::new();
        serde_json::to_writer(&mut item_buf, event)?;

        writeln!(
            writer,
            r#"{{"type":"{}","length":{}}}"#,
            event.ty,
            item_buf.len()
        )?;
        writer.write_all(&item_buf)?;
        writeln!(writer)?;

        Ok(())
    }
}

impl PayloadSerializer for EnvelopeSerializer {
    fn serialize(&self, event: &Event) -> io::Result<Vec<u8>> {
        let mut body = Vec::new();
        self.to_writer(event, &mut body)?;
        Ok(body)
    }
}
