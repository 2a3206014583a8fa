mod common;
mod test_abilities;
mod test_effects;
mod test_events;
mod test_items;
mod test_switching;
