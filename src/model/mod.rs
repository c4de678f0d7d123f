pub mod okr;
pub mod work_item;
