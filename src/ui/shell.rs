//! Page shell: which tabs a role sees and which one is active.

use crate::session::{Capability, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Products,
    Categories,
    Suppliers,
    Services,
    Users,
    Reports,
}

impl Tab {
    pub fn slug(&self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Products => "products",
            Tab::Categories => "categories",
            Tab::Suppliers => "suppliers",
            Tab::Services => "services",
            Tab::Users => "users",
            Tab::Reports => "reports",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Products => "Products",
            Tab::Categories => "Categories",
            Tab::Suppliers => "Suppliers",
            Tab::Services => "Services",
            Tab::Users => "Users",
            Tab::Reports => "Reports",
        }
    }

    /// Capability needed to see the tab in the admin area. Employees get
    /// read-only variants of the tabs they can see instead.
    pub fn capability(&self) -> Option<Capability> {
        match self {
            Tab::Dashboard => None,
            Tab::Products | Tab::Categories | Tab::Suppliers => Some(Capability::ManageInventory),
            Tab::Services => Some(Capability::ManageServices),
            Tab::Users => Some(Capability::ManageUsers),
            Tab::Reports => Some(Capability::ViewReports),
        }
    }

    pub fn for_role(role: Role) -> Vec<Tab> {
        match role {
            Role::Admin => {
                let caps = role.capabilities();
                [
                    Tab::Dashboard,
                    Tab::Products,
                    Tab::Categories,
                    Tab::Suppliers,
                    Tab::Services,
                    Tab::Users,
                    Tab::Reports,
                ]
                .into_iter()
                .filter(|tab| tab.capability().map_or(true, |c| caps.allows(c)))
                .collect()
            }
            Role::Employee => vec![Tab::Dashboard, Tab::Products, Tab::Services],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

/// Everything the layout template needs around a view.
#[derive(Debug, Clone)]
pub struct Shell {
    pub role: Role,
    /// `/admin` or `/user`
    pub area: &'static str,
    pub title: &'static str,
    pub nav: Vec<NavItem>,
}

impl Shell {
    pub fn new(role: Role, active: Tab) -> Self {
        let area = role.home_path();
        let nav = Tab::for_role(role)
            .into_iter()
            .map(|tab| NavItem {
                label: tab.label(),
                href: format!("{}/{}", area, tab.slug()),
                active: tab == active,
            })
            .collect();
        Self {
            role,
            area,
            title: active.label(),
            nav,
        }
    }

    pub fn role_label(&self) -> &'static str {
        match self.role {
            Role::Admin => "Admin",
            Role::Employee => "Employee",
        }
    }

    pub fn href(&self, rest: &str) -> String {
        format!("{}/{}", self.area, rest.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_sees_every_tab() {
        let shell = Shell::new(Role::Admin, Tab::Users);
        let labels: Vec<&str> = shell.nav.iter().map(|n| n.label).collect();
        assert_eq!(
            labels,
            vec!["Dashboard", "Products", "Categories", "Suppliers", "Services", "Users", "Reports"]
        );
        let active: Vec<&NavItem> = shell.nav.iter().filter(|n| n.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].href, "/admin/users");
    }

    #[test]
    fn test_employee_nav_is_read_only_subset() {
        let shell = Shell::new(Role::Employee, Tab::Dashboard);
        let hrefs: Vec<&str> = shell.nav.iter().map(|n| n.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/user/dashboard", "/user/products", "/user/services"]);
        assert_eq!(shell.href("/products"), "/user/products");
    }
}
