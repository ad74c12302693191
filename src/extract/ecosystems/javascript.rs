//! Routing idioms for JavaScript/TypeScript: Express fluent routers,
//! NestJS decorators, Fastify.

use crate::extract::rules::{Ecosystem, MethodSpec, PathSpec, RouteRule};

pub fn rules() -> Vec<RouteRule> {
    vec![
        // Express-style verb calls on an app or router object.
        RouteRule {
            framework: "Express",
            ecosystem: Ecosystem::JavaScript,
            pattern: r#"(?:app|router)\.(get|post|put|delete|patch)\s*\(\s*["'`]([^"'`]+)["'`]"#,
            method: MethodSpec::Capture(1),
            path: PathSpec::Capture(2),
        },
        // Express route chains: router.route('/x').get(...).
        RouteRule {
            framework: "Express",
            ecosystem: Ecosystem::JavaScript,
            pattern: r#"\.route\s*\(\s*["'`]([^"'`]+)["'`]\s*\)\s*\.(get|post|put|delete|patch)\b"#,
            method: MethodSpec::Capture(2),
            path: PathSpec::Capture(1),
        },
        // NestJS method decorators with an explicit path.
        RouteRule {
            framework: "NestJS",
            ecosystem: Ecosystem::JavaScript,
            pattern: r#"@(Get|Post|Put|Delete|Patch)\s*\(\s*["']([^"']+)["']\s*\)"#,
            method: MethodSpec::Annotation(1),
            path: PathSpec::Capture(2),
        },
        // NestJS bare decorators route by handler name.
        RouteRule {
            framework: "NestJS",
            ecosystem: Ecosystem::JavaScript,
            pattern: r#"@(Get|Post|Put|Delete|Patch)\s*\(\s*\)\s*\r?\n\s*(?:async\s+)?([A-Za-z_]\w*)\s*\("#,
            method: MethodSpec::Annotation(1),
            path: PathSpec::HandlerName(2),
        },
        RouteRule {
            framework: "Fastify",
            ecosystem: Ecosystem::JavaScript,
            pattern: r#"fastify\.(get|post|put|delete|patch)\s*\(\s*["'`]([^"'`]+)["'`]"#,
            method: MethodSpec::Capture(1),
            path: PathSpec::Capture(2),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ecosystems::testing::derive;
    use yare::parameterized;

    #[parameterized(
        express_get = { "app.get('/api/users', handler)", "GET", "/api/users" },
        express_param = { "router.delete('/orders/:id', remove)", "DELETE", "/orders/:id" },
        express_template = { "app.post(`/items`, create)", "POST", "/items" },
        route_chain = { "router.route('/users').put(update)", "PUT", "/users" },
        nest_with_path = { "@Get('profile/:id')", "GET", "profile/:id" },
        fastify = { "fastify.post('/webhooks', opts, handler)", "POST", "/webhooks" },
    )]
    fn test_rule_derivation(sample: &str, method: &str, path: &str) {
        let derived = derive(&rules(), sample).unwrap();
        assert_eq!(derived.0, method);
        assert_eq!(derived.1, path);
    }

    #[test]
    fn test_bare_nest_decorator_uses_handler_name() {
        let sample = "@Post()\n  async createUser(@Body() dto: CreateUserDto) {";
        let derived = derive(&rules(), sample).unwrap();
        assert_eq!(derived, ("POST".to_string(), "/createUser".to_string()));
    }

    #[test]
    fn test_middleware_registration_is_not_a_route() {
        assert!(derive(&rules(), "app.use('/api', jsonParser)").is_none());
    }
}
