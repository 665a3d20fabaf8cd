pub mod tenant_service;
