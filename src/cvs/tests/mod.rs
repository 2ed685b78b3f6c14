// src/cvs/tests/mod.rs

mod structurer_tests;
