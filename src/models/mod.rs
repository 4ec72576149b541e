pub mod efficiency;
