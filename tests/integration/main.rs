//! Integration tests for the Heavy Horizon HTTP surface

mod api_tests;
