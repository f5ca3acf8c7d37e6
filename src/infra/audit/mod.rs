pub mod http_audit_sink;
