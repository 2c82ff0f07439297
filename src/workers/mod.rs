pub mod push_worker;
