use super::test_helpers::*;
use super::*;
use crate::error::Error;
use crate::types::Event;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};
