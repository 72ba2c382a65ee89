//! Path → view table for every portal.
//!
//! Routes are grouped into disjoint subtrees; each group carries the set of
//! roles allowed inside it. Lookup is exact on the normalized path.

use crate::Role;
use std::collections::HashMap;

pub mod paths {
    pub const LANDING: &str = "/";
    pub const PRICING: &str = "/pricing";
    pub const PAYMENT_SUCCESS: &str = "/payment-success";
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const PATIENT_DASHBOARD: &str = "/dashboard";
    pub const CLINIC_PATIENT_DASHBOARD: &str = "/clinic/patient/dashboard";
    pub const CLINIC_DASHBOARD: &str = "/clinic/dashboard";
    pub const DOCTOR_DASHBOARD: &str = "/doctor/dashboard";
    pub const ADMIN_DASHBOARD: &str = "/v1/portal/admin/dashboard";
}

/// Route subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteGroup {
    Public,
    Patient,
    PatientInClinic,
    ClinicStaff,
    Doctor,
    Admin,
}

impl RouteGroup {
    /// Roles allowed in this subtree. Empty for public routes.
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            RouteGroup::Public => &[],
            RouteGroup::Patient | RouteGroup::PatientInClinic => &[Role::Patient],
            RouteGroup::ClinicStaff => &[Role::ClinicStaff, Role::ClinicAdmin],
            RouteGroup::Doctor => &[Role::Doctor],
            RouteGroup::Admin => &[Role::Admin],
        }
    }

    pub fn is_protected(&self) -> bool {
        *self != RouteGroup::Public
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }

    /// Path prefix of the subtree
    pub fn base_path(&self) -> &'static str {
        match self {
            RouteGroup::Public => "/",
            RouteGroup::Patient => "/dashboard",
            RouteGroup::PatientInClinic => "/clinic/patient",
            RouteGroup::ClinicStaff => "/clinic/dashboard",
            RouteGroup::Doctor => "/doctor",
            RouteGroup::Admin => "/v1/portal/admin",
        }
    }
}

/// Screen a route resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Landing,
    Pricing,
    PaymentSuccess,
    Login,
    Register,

    PatientDashboard,
    MedicalData,
    Analysis,
    Documents,
    PatientProfile,
    RecommendedClinics,
    PatientInvoices,
    PatientAppointments,
    RecommendedDoctors,

    ClinicPatientDashboard,
    ClinicDoctors,
    ClinicBooking,
    ClinicRecords,
    ClinicPatientInvoices,

    StaffDashboard,
    StaffRequests,
    StaffDoctors,
    StaffInvoices,
    StaffAppointments,
    StaffSettings,
    StaffLabOrders,

    DoctorDashboard,
    DoctorPatients,
    DoctorAppointments,
    DoctorLabOrders,
    DoctorDocumentReviews,
    DoctorProfile,

    AdminDashboard,
    AdminUsers,
    AdminSettings,
    AdminPayments,
    AdminClinics,
    AdminDoctors,
    AdminPatients,
    AdminAppointments,
    AdminPlans,
    AdminClinicStaff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: &'static str,
    pub group: RouteGroup,
    pub view: View,
}

const STANDARD_ROUTES: &[(&str, RouteGroup, View)] = {
    use crate::routes::RouteGroup as G;
    use crate::routes::View as V;
    &[
        ("/", G::Public, V::Landing),
        ("/pricing", G::Public, V::Pricing),
        ("/payment-success", G::Public, V::PaymentSuccess),
        ("/login", G::Public, V::Login),
        ("/register", G::Public, V::Register),
        ("/dashboard", G::Patient, V::PatientDashboard),
        ("/dashboard/records", G::Patient, V::MedicalData),
        ("/dashboard/analysis", G::Patient, V::Analysis),
        ("/dashboard/documents", G::Patient, V::Documents),
        ("/dashboard/profile", G::Patient, V::PatientProfile),
        ("/dashboard/clinics/recommended", G::Patient, V::RecommendedClinics),
        ("/dashboard/invoices", G::Patient, V::PatientInvoices),
        ("/dashboard/appointments", G::Patient, V::PatientAppointments),
        ("/dashboard/doctors/best", G::Patient, V::RecommendedDoctors),
        ("/clinic/patient/dashboard", G::PatientInClinic, V::ClinicPatientDashboard),
        ("/clinic/patient/doctors", G::PatientInClinic, V::ClinicDoctors),
        ("/clinic/patient/book", G::PatientInClinic, V::ClinicBooking),
        ("/clinic/patient/records", G::PatientInClinic, V::ClinicRecords),
        ("/clinic/patient/invoices", G::PatientInClinic, V::ClinicPatientInvoices),
        ("/clinic/dashboard", G::ClinicStaff, V::StaffDashboard),
        ("/clinic/dashboard/requests", G::ClinicStaff, V::StaffRequests),
        ("/clinic/dashboard/doctors", G::ClinicStaff, V::StaffDoctors),
        ("/clinic/dashboard/invoices", G::ClinicStaff, V::StaffInvoices),
        ("/clinic/dashboard/appointments", G::ClinicStaff, V::StaffAppointments),
        ("/clinic/dashboard/settings", G::ClinicStaff, V::StaffSettings),
        ("/clinic/dashboard/labOrderClinis", G::ClinicStaff, V::StaffLabOrders),
        ("/doctor/dashboard", G::Doctor, V::DoctorDashboard),
        ("/doctor/patients", G::Doctor, V::DoctorPatients),
        ("/doctor/appointments", G::Doctor, V::DoctorAppointments),
        ("/doctor/orders", G::Doctor, V::DoctorLabOrders),
        ("/doctor/reviews", G::Doctor, V::DoctorDocumentReviews),
        ("/doctor/profile", G::Doctor, V::DoctorProfile),
        ("/v1/portal/admin/dashboard", G::Admin, V::AdminDashboard),
        ("/v1/portal/admin/users", G::Admin, V::AdminUsers),
        ("/v1/portal/admin/settings", G::Admin, V::AdminSettings),
        ("/v1/portal/admin/payments", G::Admin, V::AdminPayments),
        ("/v1/portal/admin/clinics", G::Admin, V::AdminClinics),
        ("/v1/portal/admin/doctors", G::Admin, V::AdminDoctors),
        ("/v1/portal/admin/patients", G::Admin, V::AdminPatients),
        ("/v1/portal/admin/appointments", G::Admin, V::AdminAppointments),
        ("/v1/portal/admin/plans", G::Admin, V::AdminPlans),
        ("/v1/portal/admin/ClinicStaffManagement", G::Admin, V::AdminClinicStaff),
    ]
};

/// Route lookup table
pub struct RouteTable {
    entries: HashMap<&'static str, RouteEntry>,
}

impl RouteTable {
    /// The portal's full route table.
    pub fn standard() -> Self {
        let entries = STANDARD_ROUTES
            .iter()
            .map(|&(path, group, view)| (path, RouteEntry { path, group, view }))
            .collect();
        Self { entries }
    }

    /// Look up a path. The path is normalized first.
    pub fn lookup(&self, path: &str) -> Option<&RouteEntry> {
        self.entries.get(normalize_path(path).as_str())
    }

    /// Canonical path of a view
    pub fn path_of(&self, view: View) -> Option<&'static str> {
        self.entries
            .values()
            .find(|entry| entry.view == view)
            .map(|entry| entry.path)
    }

    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Normalize a navigation target.
///
/// Drops a hash-router prefix, the query string and the fragment, collapses
/// repeated slashes and removes the trailing slash (the root stays `/`).
pub fn normalize_path(raw: &str) -> String {
    let raw = raw.trim();
    let raw = raw.strip_prefix('#').unwrap_or(raw);
    let raw = raw.split(['?', '#']).next().unwrap_or("");

    let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}", segments.join("/"))
}
