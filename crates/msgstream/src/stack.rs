//! Regrouping of flat table rows under their table headers.

use crate::message::{Message, TableGroup, Tag};

enum Slot {
    Passthrough(Message),
    Group(TableGroup),
}

/// Fold every `r` message into the group opened by the closest preceding
/// `t` message.
///
/// Each `t` opens a fresh group even when the previous group is still empty.
/// Rows that arrive before any `t` open a headerless group. Groups keep the
/// position of the message that opened them; everything else passes through
/// in order.
///
/// Expects flat input.
pub fn stack(messages: Vec<Message>) -> Vec<Message> {
    let mut slots: Vec<Slot> = Vec::with_capacity(messages.len());
    let mut open: Option<usize> = None;

    for Message(tag, payload) in messages {
        match tag {
            Tag::Table => {
                open = Some(slots.len());
                slots.push(Slot::Group(TableGroup::with_header(payload)));
            }
            Tag::Row => {
                let idx = match open {
                    Some(idx) => idx,
                    None => {
                        slots.push(Slot::Group(TableGroup::headerless()));
                        let idx = slots.len() - 1;
                        open = Some(idx);
                        idx
                    }
                };
                if let Slot::Group(group) = &mut slots[idx] {
                    group.rows.push(payload);
                }
            }
            tag => slots.push(Slot::Passthrough(Message(tag, payload))),
        }
    }

    slots
        .into_iter()
        .map(|slot| match slot {
            Slot::Passthrough(message) => message,
            Slot::Group(group) => group.into_message(),
        })
        .collect()
}
