mod customer_tests;
mod ticket_tests;
mod token_tests;
