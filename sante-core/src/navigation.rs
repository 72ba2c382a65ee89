use crate::routes::paths;
use crate::Role;

/// Sidebar entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub path: &'static str,
    pub label: &'static str,
    /// Index links are only active on their own path
    pub exact: bool,
}

const fn link(path: &'static str, label: &'static str) -> NavLink {
    NavLink { path, label, exact: false }
}

const fn index(path: &'static str, label: &'static str) -> NavLink {
    NavLink { path, label, exact: true }
}

const ADMIN_LINKS: &[NavLink] = &[
    index(paths::ADMIN_DASHBOARD, "Overview"),
    link("/v1/portal/admin/users", "Users"),
    link("/v1/portal/admin/clinics", "Clinics"),
    link("/v1/portal/admin/doctors", "Doctors"),
    link("/v1/portal/admin/patients", "Patients"),
    link("/v1/portal/admin/appointments", "Appointments"),
    link("/v1/portal/admin/plans", "Plans & Pricing"),
    link("/v1/portal/admin/payments", "Payments"),
    link("/v1/portal/admin/settings", "System Settings"),
    link("/v1/portal/admin/ClinicStaffManagement", "Clinic Staff"),
];

const STAFF_LINKS: &[NavLink] = &[
    index(paths::CLINIC_DASHBOARD, "Dashboard"),
    link("/clinic/dashboard/labOrderClinis", "Patient Requests"),
    link("/clinic/dashboard/doctors", "Our Doctors"),
    link("/clinic/dashboard/invoices", "Invoices"),
    link("/clinic/dashboard/appointments", "Appointments"),
    link("/clinic/dashboard/settings", "Settings"),
];

const DOCTOR_LINKS: &[NavLink] = &[
    index(paths::DOCTOR_DASHBOARD, "Dashboard"),
    link("/doctor/patients", "Patients"),
    link("/doctor/orders", "Lab Orders"),
    link("/doctor/reviews", "Documents"),
    link("/doctor/appointments", "Schedule"),
    link("/doctor/profile", "Profile"),
];

const CLINIC_PATIENT_LINKS: &[NavLink] = &[
    index(paths::CLINIC_PATIENT_DASHBOARD, "Clinic Home"),
    link("/clinic/patient/doctors", "Our Doctors"),
    link("/clinic/patient/book", "Book Appointment"),
    link("/clinic/patient/records", "My Records"),
    link("/clinic/patient/invoices", "Invoices"),
];

const PATIENT_LINKS: &[NavLink] = &[
    index(paths::PATIENT_DASHBOARD, "Home"),
    link("/dashboard/records", "My Vitals"),
    link("/dashboard/analysis", "AI Analysis"),
    link("/dashboard/documents", "Documents"),
    link("/dashboard/appointments", "Appointments"),
    link("/dashboard/clinics/recommended", "Clinics"),
    link("/dashboard/doctors/best", "Doctors"),
    link("/dashboard/profile", "Profile"),
];

/// Sidebar links for a role; patients in clinic mode get the clinic links.
pub fn sidebar_links(role: Role, in_clinic: bool) -> &'static [NavLink] {
    match role {
        Role::Admin => ADMIN_LINKS,
        Role::ClinicStaff | Role::ClinicAdmin => STAFF_LINKS,
        Role::Doctor => DOCTOR_LINKS,
        Role::Patient if in_clinic => CLINIC_PATIENT_LINKS,
        Role::Patient => PATIENT_LINKS,
    }
}

impl NavLink {
    /// Whether the link should be highlighted for the current path
    pub fn is_active(&self, current: &str) -> bool {
        let current = crate::routes::normalize_path(current);
        if current == self.path {
            return true;
        }
        !self.exact
            && current
                .strip_prefix(self.path)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}
