//! Routing idioms for Ruby: Rails route files and Sinatra-style verbs.

use crate::extract::rules::{Ecosystem, MethodSpec, PathSpec, RouteRule};

pub fn rules() -> Vec<RouteRule> {
    vec![
        // Rails/Sinatra verb declarations: get '/users' ...
        RouteRule {
            framework: "Rails",
            ecosystem: Ecosystem::Ruby,
            pattern: r#"(?m)^\s*(get|post|put|delete|patch)\s+["']([^"']+)["']"#,
            method: MethodSpec::Capture(1),
            path: PathSpec::Capture(2),
        },
        // Rails resource tables imply an index route on the collection.
        RouteRule {
            framework: "Rails",
            ecosystem: Ecosystem::Ruby,
            pattern: r#"(?m)^\s*resources?\s+:(\w+)"#,
            method: MethodSpec::Fixed("GET"),
            path: PathSpec::HandlerName(1),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ecosystems::testing::derive;
    use yare::parameterized;

    #[parameterized(
        rails_get = { "  get 'users/:id', to: 'users#show'", "GET", "users/:id" },
        rails_post = { "  post '/orders'", "POST", "/orders" },
        sinatra = { "get '/hello' do", "GET", "/hello" },
        resources = { "  resources :tickets", "GET", "/tickets" },
    )]
    fn test_rule_derivation(sample: &str, method: &str, path: &str) {
        let derived = derive(&rules(), sample).unwrap();
        assert_eq!(derived.0, method);
        assert_eq!(derived.1, path);
    }

    #[test]
    fn test_variable_assignment_is_not_a_route() {
        assert!(derive(&rules(), "status = get_status(order)").is_none());
    }
}
