//! Internal implementation details.

pub(crate) mod panic;
pub(crate) mod subscriber_list;
pub(crate) mod sync;

pub(crate) use subscriber_list::SubscriberList;
