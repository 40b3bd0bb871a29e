mod helpers;
mod issue_test;
